use jqdata_rs::bars::{get_bars, get_price};

use crate::common::{self, ScriptedTransport};

const DAILY: &str = "date,open,close,high,low,volume,money,paused,high_limit,low_limit,avg,pre_close\n\
    2021-05-31,21.10,21.30,21.50,20.90,51234567.0,1091234567.0,0,23.21,18.99,21.25,21.10\n\
    2021-06-01,21.30,21.80,21.95,21.20,61234567.0,1331234567.0,0,23.43,19.17,21.70,21.30\n";

#[tokio::test]
async fn bars_fetch_each_code_with_normalized_unit() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(DAILY).reply(DAILY);
    let client = common::client(&t);

    let bars = get_bars(&client, ["000001.XSHE", "600000.XSHG"], 2)
        .unit("daily")
        .end_dt("2021-06-01")
        .include_now(true)
        .fetch()
        .await
        .unwrap();

    assert_eq!(bars.keys().collect::<Vec<_>>(), ["000001.XSHE", "600000.XSHG"]);
    let b = &bars["600000.XSHG"][1];
    assert_eq!(b.date.to_string(), "2021-06-01 00:00:00");
    assert!((b.close - 21.80).abs() < 1e-9);
    assert_eq!(b.paused, Some(false));
    assert_eq!(b.pre_close, Some(21.30));

    let sent = t.sent_for("get_bars");
    assert_eq!(sent.len(), 2);
    for req in &sent {
        assert_eq!(req["unit"], "1d");
        assert_eq!(req["count"], "2");
        assert_eq!(req["end_date"], "2021-06-01 00:00:00");
        assert_eq!(req["include_now"], "true");
        assert!(req.get("fq_ref_date").is_none());
    }
}

#[tokio::test]
async fn bars_table_stacks_codes_with_selected_fields() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(DAILY).reply(DAILY);
    let client = common::client(&t);

    let table = get_bars(&client, "000001.XSHE,600000.XSHG", 2)
        .fields(["close", "volume"])
        .fetch_table()
        .await
        .unwrap();

    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        ["code", "date", "close", "volume"]
    );
    assert_eq!(table.len(), 4);
    assert_eq!(table.row(0).unwrap().str("code"), Some("000001.XSHE"));
    assert_eq!(table.row(3).unwrap().str("code"), Some("600000.XSHG"));
    assert!(t.sent_for("get_bars")[0].get("include_now").is_none());
}

#[tokio::test]
async fn price_by_count_uses_get_price() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(DAILY);
    let client = common::client(&t);

    let table = get_price(&client, "000001.XSHE")
        .count(2)
        .end_date("2021-06-01")
        .frequency("daily")
        .fetch()
        .await
        .unwrap();

    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        ["date", "open", "close", "high", "low", "volume", "money"]
    );
    let req = &t.sent_for("get_price")[0];
    assert_eq!(req["count"], "2");
    assert_eq!(req["unit"], "1d");
    assert_eq!(req["end_date"], "2021-06-01 00:00:00");
    assert!(req.get("date").is_none());
}

#[tokio::test]
async fn price_without_start_or_count_starts_in_2015() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(DAILY);
    let client = common::client(&t);

    let bars = get_price(&client, "000001.XSHE")
        .end_date("2021-06-01")
        .fetch_bars()
        .await
        .unwrap();
    assert_eq!(bars.len(), 2);

    let req = &t.sent_for("get_price_period")[0];
    assert_eq!(req["date"], "2015-01-01 00:00:00");
    assert!(req.get("count").is_none());
}

#[tokio::test]
async fn price_fields_pick_columns() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(DAILY);
    let client = common::client(&t);

    let table = get_price(&client, "000001.XSHE")
        .start_date("2021-05-31")
        .end_date("2021-06-01")
        .fields(["close", "avg"])
        .fetch()
        .await
        .unwrap();
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        ["date", "close", "avg"]
    );
    assert_eq!(table.row(1).unwrap().f64("avg"), Some(21.70));
}
