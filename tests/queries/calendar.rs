use chrono::NaiveDate;
use jqdata_rs::calendar::{get_all_trade_days, get_trade_days};

use crate::common::{self, ScriptedTransport};

const DAYS: &str = "2021-06-01\n2021-06-02\n2021-06-03\n2021-06-04\n2021-06-07\n2021-06-08\n";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[tokio::test]
async fn all_trade_days_parse_in_order() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(DAYS);
    let client = common::client(&t);

    let days = get_all_trade_days(&client).await.unwrap();
    assert_eq!(days.len(), 6);
    assert_eq!(days[0], d(2021, 6, 1));
    assert_eq!(days[5], d(2021, 6, 8));
}

#[tokio::test]
async fn count_window_is_cut_from_the_full_calendar() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(DAYS);
    let client = common::client(&t);

    // 2021-06-05 is a Saturday: the window ends at the Friday before.
    let days = get_trade_days(&client, None, Some("2021-06-05".into()), Some(3))
        .await
        .unwrap();
    assert_eq!(days, vec![d(2021, 6, 2), d(2021, 6, 3), d(2021, 6, 4)]);
    assert_eq!(t.sent_for("get_all_trade_days").len(), 1);
}

#[tokio::test]
async fn start_window_asks_the_service_for_the_range() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("2021-06-03 2021-06-04 2021-06-07");
    let client = common::client(&t);

    let days = get_trade_days(
        &client,
        Some(d(2021, 6, 3).into()),
        Some("2021-06-07 15:00:00".into()),
        None,
    )
    .await
    .unwrap();
    assert_eq!(days.len(), 3);

    let req = &t.sent_for("get_trade_days")[0];
    assert_eq!(req["date"], "2021-06-03");
    assert_eq!(req["end_date"], "2021-06-07");
}

#[tokio::test]
async fn inverted_window_is_empty_without_a_request() {
    let t = ScriptedTransport::new();
    let client = common::client(&t);

    let days = get_trade_days(
        &client,
        Some("2021-06-08".into()),
        Some("2021-06-01".into()),
        None,
    )
    .await
    .unwrap();
    assert!(days.is_empty());
    assert!(t.sent().is_empty());
}
