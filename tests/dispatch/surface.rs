use jqdata_rs::{ColumnType, JqError, Params, Payload};
use serde_json::json;

use crate::common::{self, ScriptedTransport};

#[tokio::test]
async fn names_outside_the_prefix_rule_are_not_dispatchable() {
    let t = ScriptedTransport::new();
    let client = common::client(&t);

    for name in ["security_info", "fetch_price", "run_query_all", "Get_price", ""] {
        let err = client.method(name).unwrap_err();
        assert!(matches!(err, JqError::UnknownMethod(ref n) if n == name), "{name}");
        assert!(err.is_local());
    }
    assert!(matches!(
        client.query("price", Params::new()).await,
        Err(JqError::UnknownMethod(_))
    ));
    assert!(t.sent().is_empty());

    assert!(client.method("run_query").is_ok());
    assert!(client.method("get_something_new").is_ok());
}

#[tokio::test]
async fn auto_format_shapes_by_method_name() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("1000000\n")
        .reply(r#"{"main_code": "000001.OF", "name": "华夏成长"}"#)
        .reply("000001.XSHE\n600000.XSHG\n")
        .reply("date,open,close\n2021-06-01,10.5,10.8\n");
    let client = common::builder(&t)
        .credentials("u", "p")
        .auto_format(true)
        .build()
        .unwrap();

    let count = client.query("get_query_count", Params::new()).await.unwrap();
    assert_eq!(count, Payload::Integer(1_000_000));

    let info = client
        .query("get_fund_info", Params::new().set("code", "000001.OF"))
        .await
        .unwrap();
    assert_eq!(info.into_json().unwrap()["name"], json!("华夏成长"));

    let stocks = client
        .query("get_index_stocks", Params::new().set("code", "000300.XSHG"))
        .await
        .unwrap();
    assert_eq!(
        stocks.into_tokens().unwrap(),
        vec!["000001.XSHE", "600000.XSHG"]
    );

    let table = client
        .query("get_price", Params::new().set("code", "000001.XSHE"))
        .await
        .unwrap()
        .into_table()
        .unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.column("close").unwrap().column_type(), ColumnType::Float);
    assert_eq!(table.row(0).unwrap().f64("close"), Some(10.8));
}

#[tokio::test]
async fn per_call_flags_override_the_client() {
    let t = ScriptedTransport::new();
    t.mint("tok").mint("tok2");
    t.reply("42").reply("42").reply("42");
    let shaping = common::builder(&t)
        .credentials("u", "p")
        .auto_format(true)
        .build()
        .unwrap();

    let raw = shaping
        .method("get_query_count")
        .unwrap()
        .auto_format(false)
        .fetch()
        .await
        .unwrap();
    assert_eq!(raw, Payload::Text("42".into()));

    let text = shaping
        .method("get_query_count")
        .unwrap()
        .show_raw(true)
        .fetch_text()
        .await
        .unwrap();
    assert_eq!(text, "42");

    let plain = common::client(&t);
    let shaped = plain
        .method("get_query_count")
        .unwrap()
        .auto_format(true)
        .fetch()
        .await
        .unwrap();
    assert_eq!(shaped.into_integer().unwrap(), 42);
}

#[tokio::test]
async fn unshapeable_payloads_are_data_errors() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("plenty");
    let client = common::client(&t);

    let err = client
        .method("get_query_count")
        .unwrap()
        .auto_format(true)
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, JqError::Data(_)), "{err:?}");
    // Shaping failures are not protocol failures: one send, no refresh.
    assert_eq!(t.call_count(), 1);
    assert_eq!(t.mint_count(), 1);
}

#[tokio::test]
async fn run_query_dispatches_by_name() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("code,day\n000001.XSHE,2021-06-01\n");
    let client = common::client(&t);

    let body = client
        .method("run_query")
        .unwrap()
        .param("table", "finance.STK_XR_XD")
        .param("count", 1)
        .fetch_text()
        .await
        .unwrap();
    assert!(body.starts_with("code,day"));
    let req = &t.sent_for("run_query")[0];
    assert_eq!(req["table"], "finance.STK_XR_XD");
    assert_eq!(req["token"], "tok");
}

#[tokio::test]
async fn named_mints_send_credentials_and_hold_the_token() {
    let t = ScriptedTransport::new();
    t.mint("minted").mint("live");
    t.reply("ok");
    let client = common::builder(&t)
        .credentials("u", "p")
        .auto_format(true)
        .build()
        .unwrap();

    let token = client.method("get_token").unwrap().fetch_text().await.unwrap();
    assert_eq!(token, "minted");
    assert_eq!(client.token().await.as_deref(), Some("minted"));
    let mint = &t.sent_for("get_token")[0];
    assert_eq!(mint["mob"], "u");
    assert_eq!(mint["pwd"], "p");
    assert!(mint.get("token").is_none());

    // Explicit credentials replace the held ones; the token comes back unshaped.
    let live = client
        .query(
            "get_current_token",
            Params::new().set("mob", "13900000000").set("pwd", "other"),
        )
        .await
        .unwrap();
    assert_eq!(live, Payload::Text("live".into()));
    assert_eq!(t.sent_for("get_current_token")[0]["mob"], "13900000000");

    // Later calls reuse the held token without minting again.
    client.call("get_concepts", &Params::new()).await.unwrap();
    assert_eq!(t.sent_for("get_concepts")[0]["token"], "live");
    assert_eq!(t.mint_count(), 2);
}
