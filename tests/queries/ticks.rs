use jqdata_rs::ticks::{get_current_tick, get_current_ticks, get_ticks};

use crate::common::{self, ScriptedTransport};

const BOOK_HEADER: &str = "a1_v,a2_v,a3_v,a4_v,a5_v,a1_p,a2_p,a3_p,a4_p,a5_p,b1_v,b2_v,b3_v,b4_v,b5_v,b1_p,b2_p,b3_p,b4_p,b5_p";
const BOOK_ROW: &str = "100,200,300,400,500,21.51,21.52,21.53,21.54,21.55,600,700,800,900,1000,21.49,21.48,21.47,21.46,21.45";

fn ticks_body(times: &[&str]) -> String {
    let mut body = format!("time,current,high,low,volume,money,{BOOK_HEADER}\n");
    for time in times {
        body.push_str(&format!("{time},21.5,21.8,21.2,120000,2580000.0,{BOOK_ROW}\n"));
    }
    body
}

#[tokio::test]
async fn current_tick_reads_the_book() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(&ticks_body(&["20210601093105.0"]));
    let client = common::client(&t);

    let tick = get_current_tick(&client, "000001.XSHE")
        .await
        .unwrap()
        .expect("one tick");
    assert_eq!(tick.time.to_string(), "2021-06-01 09:31:05");
    assert_eq!(tick.asks[0].price, 21.51);
    assert_eq!(tick.bids[0].volume, 600.0);
    assert_eq!(t.sent_for("get_current_tick")[0]["code"], "000001.XSHE");
}

#[tokio::test]
async fn current_ticks_are_keyed_by_code() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(&format!(
        "code,time,current,high,low,volume,money,{BOOK_HEADER}\n\
         000001.XSHE,20210601093105,21.5,21.8,21.2,120000,2580000.0,{BOOK_ROW}\n\
         600000.XSHG,20210601093106,9.9,10.0,9.8,80000,792000.0,{BOOK_ROW}\n"
    ));
    let client = common::client(&t);

    let ticks = get_current_ticks(&client, vec!["000001.XSHE", "600000.XSHG"])
        .await
        .unwrap();
    assert_eq!(ticks.len(), 2);
    assert_eq!(ticks["600000.XSHG"].current, 9.9);
    assert_eq!(
        t.sent_for("get_current_ticks")[0]["code"],
        "000001.XSHE,600000.XSHG"
    );
}

#[tokio::test]
async fn tick_count_window_uses_get_ticks() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(&ticks_body(&["20210601093103", "20210601093106"]));
    let client = common::client(&t);

    let ticks = get_ticks(&client, "000001.XSHE")
        .count(2)
        .end_dt("2021-06-01 09:32:00")
        .fetch()
        .await
        .unwrap();
    assert_eq!(ticks["000001.XSHE"].len(), 2);

    let req = &t.sent_for("get_ticks")[0];
    assert_eq!(req["count"], "2");
    assert_eq!(req["end_date"], "2021-06-01 09:32:00");
    assert_eq!(req["skip"], "true");
    assert!(req.get("date").is_none());
}

#[tokio::test]
async fn tick_period_defaults_to_the_start_of_the_end_day() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(&ticks_body(&["20210601093103"]));
    let client = common::client(&t);

    let table = get_ticks(&client, "000001.XSHE")
        .end_dt("2021-06-01 10:00:00")
        .skip(false)
        .fields(["current"])
        .fetch_table()
        .await
        .unwrap();
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        ["code", "time", "current"]
    );

    let req = &t.sent_for("get_ticks_period")[0];
    assert_eq!(req["date"], "2021-06-01 00:00:00");
    assert_eq!(req["end_date"], "2021-06-01 10:00:00");
    assert_eq!(req["skip"], "false");
}
