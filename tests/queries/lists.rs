use jqdata_rs::lists;

use crate::common::{self, ScriptedTransport};

#[tokio::test]
async fn code_lists_split_on_whitespace_even_without_auto_format() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("000001.XSHE\n000002.XSHE\n600000.XSHG\n")
        .reply("AU2106.XSGE AU2108.XSGE\n")
        .reply("");
    let client = common::client(&t);
    assert!(!client.auto_format_enabled());

    let index = lists::get_index_stocks(&client, "000300.XSHG", Some("2021-06-01".into()))
        .await
        .unwrap();
    assert_eq!(index, ["000001.XSHE", "000002.XSHE", "600000.XSHG"]);

    let contracts = lists::get_future_contracts(&client, "AU", None).await.unwrap();
    assert_eq!(contracts, ["AU2106.XSGE", "AU2108.XSGE"]);

    assert!(lists::get_margincash_stocks(&client, None).await.unwrap().is_empty());

    let req = &t.sent_for("get_index_stocks")[0];
    assert_eq!(req["code"], "000300.XSHG");
    assert_eq!(req["date"], "2021-06-01");
    assert!(t.sent_for("get_margincash_stocks")[0].get("code").is_none());
}

#[tokio::test]
async fn industry_and_concept_members() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("000001.XSHE 600000.XSHG").reply("300750.XSHE");
    let client = common::client(&t);

    let banks = lists::get_industry_stocks(&client, "J66", None).await.unwrap();
    assert_eq!(banks.len(), 2);
    let concept = lists::get_concept_stocks(&client, "SC0084", None).await.unwrap();
    assert_eq!(concept, ["300750.XSHE"]);
    assert_eq!(t.sent_for("get_concept_stocks")[0]["code"], "SC0084");
}

#[tokio::test]
async fn dominant_future_is_trimmed_or_none() {
    let t = ScriptedTransport::new();
    t.mint("tok");
    t.reply("AU2106.XSGE\n").reply("\n");
    let client = common::client(&t);

    assert_eq!(
        lists::get_dominant_future(&client, "AU", None).await.unwrap().as_deref(),
        Some("AU2106.XSGE")
    );
    assert_eq!(lists::get_dominant_future(&client, "XX", None).await.unwrap(), None);
}
