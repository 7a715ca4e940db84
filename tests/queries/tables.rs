use jqdata_rs::fundamentals::{self, Op, Query};
use jqdata_rs::{QuotaField, get_query_count, market};

use crate::common::{self, ScriptedTransport};

const FLOW: &str = "date,change_pct,net_amount_main,net_pct_main\n\
    2021-06-01,2.35,15234.5,8.12\n\
    2021-06-02,-0.87,-4021.0,-3.05\n";

#[tokio::test]
async fn money_flow_stacks_codes_under_a_key_column() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(FLOW).reply(FLOW);
    let client = common::client(&t);

    let table = market::get_money_flow(
        &client,
        ["000001.XSHE", "600000.XSHG"],
        Some("2021-06-01".into()),
        Some("2021-06-02".into()),
        None,
        &["date", "net_amount_main"],
    )
    .await
    .unwrap();

    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        ["code", "date", "net_amount_main"]
    );
    assert_eq!(table.len(), 4);
    assert_eq!(table.row(2).unwrap().str("code"), Some("600000.XSHG"));
    assert_eq!(table.row(1).unwrap().f64("net_amount_main"), Some(-4021.0));

    let sent = t.sent_for("get_money_flow");
    assert_eq!(sent.len(), 2);
    for req in &sent {
        assert_eq!(req["date"], "2021-06-01");
        assert_eq!(req["end_date"], "2021-06-02");
        assert!(req.get("count").is_none());
    }
}

#[tokio::test]
async fn mtss_by_count() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("date,sec_code,fin_value,sec_value\n2021-06-01,000001.XSHE,5.1e9,2.3e7\n");
    let client = common::client(&t);

    let table = market::get_mtss(&client, "000001.XSHE", None, Some("2021-06-01".into()), Some(1), &[])
        .await
        .unwrap();
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        ["code", "date", "sec_code", "fin_value", "sec_value"]
    );
    assert_eq!(table.row(0).unwrap().f64("fin_value"), Some(5.1e9));
    let req = &t.sent_for("get_mtss")[0];
    assert_eq!(req["count"], "1");
    assert_eq!(req["code"], "000001.XSHE");
}

#[tokio::test]
async fn key_column_is_not_duplicated() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("code,industry_code,industry_name\n000001.XSHE,J66,货币金融服务\n");
    let client = common::client(&t);

    let table = market::get_industry(&client, "000001.XSHE", None).await.unwrap();
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        ["code", "industry_code", "industry_name"]
    );
}

#[tokio::test]
async fn industries_default_to_the_csrc_scheme() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("index,name,start_date\nA01,农业,1993-01-01\n")
        .reply("index,name,start_date\n801010,农林牧渔I,2004-02-10\n");
    let client = common::client(&t);

    market::get_industries(&client, None, None).await.unwrap();
    let sw = market::get_industries(&client, Some("sw_l1"), Some("2021-06-01".into()))
        .await
        .unwrap();
    assert_eq!(sw.row(0).unwrap().str("name"), Some("农林牧渔I"));

    let sent = t.sent_for("get_industries");
    assert_eq!(sent[0]["code"], "zjw");
    assert!(sent[0].get("date").is_none());
    assert_eq!(sent[1]["code"], "sw_l1");
    assert_eq!(sent[1]["date"], "2021-06-01");
}

#[tokio::test]
async fn index_weights_are_one_request() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("code,display_name,date,weight\n600519.XSHG,贵州茅台,2021-05-31,5.71\n");
    let client = common::client(&t);

    let table = market::get_index_weights(&client, "000300.XSHG", Some("2021-06-01".into()))
        .await
        .unwrap();
    assert_eq!(table.row(0).unwrap().f64("weight"), Some(5.71));
    let req = &t.sent_for("get_index_weights")[0];
    assert_eq!(req["code"], "000300.XSHG");
    assert_eq!(req["date"], "2021-06-01");
}

#[tokio::test]
async fn fundamentals_send_table_columns_and_code() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("code,day,pe_ratio,market_cap\n000001.XSHE,2021-06-01,12.5,4430.2\n");
    let client = common::client(&t);

    let table = fundamentals::get_fundamentals(
        &client,
        "valuation",
        &["pe_ratio", "market_cap"],
        "000001.XSHE",
        Some("2021-06-01".into()),
        None,
    )
    .await
    .unwrap();
    assert_eq!(table.row(0).unwrap().f64("pe_ratio"), Some(12.5));

    let req = &t.sent_for("get_fundamentals")[0];
    assert_eq!(req["table"], "valuation");
    assert_eq!(req["columns"], "pe_ratio,market_cap");
    assert_eq!(req["code"], "000001.XSHE");
    assert_eq!(req["date"], "2021-06-01");
    assert!(req.get("count").is_none());
}

#[tokio::test]
async fn run_query_puts_conditions_on_the_wire() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("code,report_date,bonus_ratio_rmb\n000001.XSHE,2020-12-31,1.8\n");
    let client = common::client(&t);

    let query = Query::new("finance.STK_XR_XD")
        .columns(["code", "report_date", "bonus_ratio_rmb"])
        .filter("code", Op::Eq, "000001.XSHE")
        .filter("report_date", Op::Ge, "2015-01-01")
        .count(10);
    let table = fundamentals::run_query(&client, &query).await.unwrap();
    assert_eq!(table.len(), 1);

    let req = &t.sent_for("run_query")[0];
    assert_eq!(req["table"], "finance.STK_XR_XD");
    assert_eq!(req["columns"], "code,report_date,bonus_ratio_rmb");
    assert_eq!(req["conditions"], "code#=#000001.XSHE&report_date#>=#2015-01-01");
    assert_eq!(req["count"], "10");
}

#[tokio::test]
async fn fund_info_is_json() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply(r#"{"fund_name": "华夏上证50ETF", "fund_type": "etf", "heavy_hold_stocks": ["600519.XSHG"]}"#);
    let client = common::client(&t);

    let info = fundamentals::get_fund_info(&client, "510050.XSHG", None).await.unwrap();
    assert_eq!(info["fund_type"], "etf");
    assert_eq!(info["heavy_hold_stocks"][0], "600519.XSHG");
}

#[tokio::test]
async fn factor_values_default_start() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("date,size,beta\n2021-06-01,27.1,0.98\n");
    let client = common::client(&t);

    let table = fundamentals::get_factor_values(
        &client,
        "000001.XSHE",
        &["size", "beta"],
        None,
        Some("2021-06-01".into()),
        None,
    )
    .await
    .unwrap();
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        ["code", "date", "size", "beta"]
    );

    let req = &t.sent_for("get_factor_values")[0];
    assert_eq!(req["date"], "2015-01-01");
    assert_eq!(req["end_date"], "2021-06-01");
    assert_eq!(req["columns"], "size,beta");
}

#[tokio::test]
async fn query_count_is_an_integer() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("998000\n").reply("1000000");
    let client = common::client(&t);

    assert_eq!(get_query_count(&client, None).await.unwrap(), 998_000);
    assert_eq!(
        get_query_count(&client, Some(QuotaField::Total)).await.unwrap(),
        1_000_000
    );
    let sent = t.sent_for("get_query_count");
    assert!(sent[0].get("field").is_none());
    assert_eq!(sent[1]["field"], "total");
}

#[tokio::test]
async fn factor_effect_sends_its_window_and_grouping() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("date,group_1,group_2\n2021-06-01,1.02,0.99\n");
    let client = common::client(&t);

    let table = fundamentals::get_factor_effect(
        &client,
        "000300.XSHG",
        "2021-01-04".into(),
        "2021-06-01".into(),
        "1W",
        "size",
        2,
    )
    .await
    .unwrap();
    assert_eq!(table.row(0).unwrap().f64("group_2"), Some(0.99));

    let req = &t.sent_for("get_factor_effect")[0];
    assert_eq!(req["code"], "000300.XSHG");
    assert_eq!(req["date"], "2021-01-04");
    assert_eq!(req["end_date"], "2021-06-01");
    assert_eq!(req["period"], "1W");
    assert_eq!(req["factor"], "size");
    assert_eq!(req["group_num"], "2");
}

#[tokio::test]
async fn baidu_factor_normalizes_the_stock() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("day,code,category,province,pc_search_index\n2021-06-01,000001.XSHE,stock,北京,120\n");
    let client = common::client(&t);

    let table = fundamentals::get_baidu_factor(&client, None, Some("2021-06-01".into()), Some("000001"), None)
        .await
        .unwrap();
    assert_eq!(table.row(0).unwrap().i64("pc_search_index"), Some(120));

    let req = &t.sent_for("get_baidu_factor")[0];
    assert_eq!(req["stock"], "000001.XSHE");
    assert_eq!(req["day"], "2021-06-01");
    assert!(req.get("category").is_none());
    assert!(req.get("province").is_none());
}

#[tokio::test]
async fn last_price_is_one_request_for_all_codes() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("code,price\n000001.XSHE,21.8\n600000.XSHG,9.9\n");
    let client = common::client(&t);

    let table = jqdata_rs::ticks::get_last_price(&client, "000001.XSHE,600000.XSHG")
        .await
        .unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.row(1).unwrap().f64("price"), Some(9.9));
    assert_eq!(
        t.sent_for("get_last_price")[0]["code"],
        "000001.XSHE,600000.XSHG"
    );
}
