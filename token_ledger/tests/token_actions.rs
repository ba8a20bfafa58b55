mod common;

use common::*;
use token_ledger::token::ErrorKind;

const CONTRACT: &str = "hello";

fn init_test() -> TestChain {
    TestChain::new(CONTRACT, &["alice", "bob", "testmetestme"])
}

#[test]
fn it_creates_a_token() {
    let mut t = init_test();
    t.push_action("create", &create_args("alice", "1000.000 TKN"), &[CONTRACT]).unwrap();

    let stats = t.get_stats("TKN").unwrap();
    assert_eq!(stats.supply.to_string(), "0.000 TKN");
    assert_eq!(stats.max_supply.to_string(), "1000.000 TKN");
    assert_eq!(stats.issuer, name("alice"));
}

#[test]
fn it_requires_the_contract_authority_to_create() {
    let mut t = init_test();
    t.push_action_require_exception(
        "create",
        &create_args("alice", "1000.000 TKN"),
        &["alice"],
        "missing authority of hello",
    );
    assert!(t.get_stats("TKN").is_none());
}

#[test]
fn it_rejects_a_negative_max_supply() {
    let mut t = init_test();
    t.push_action_require_exception(
        "create",
        &create_args("alice", "-1000.000 TKN"),
        &[CONTRACT],
        "max_supply must be positive",
    );
}

#[test]
fn it_rejects_an_existing_symbol() {
    let mut t = init_test();
    t.push_action("create", &create_args("alice", "100 TKN"), &[CONTRACT]).unwrap();
    let stats = t.get_stats("TKN").unwrap();
    assert_eq!(stats.supply.to_string(), "0 TKN");
    assert_eq!(stats.max_supply.to_string(), "100 TKN");

    t.push_action_require_exception(
        "create",
        &create_args("alice", "100 TKN"),
        &[CONTRACT],
        "token with symbol already exists",
    );
}

#[test]
fn it_creates_the_largest_supply() {
    let mut t = init_test();
    let args = create_args("alice", "4611686018427387903 TKN");
    t.push_action("create", &args, &[CONTRACT]).unwrap();
    let stats = t.get_stats("TKN").unwrap();
    assert_eq!(stats.supply.to_string(), "0 TKN");
    assert_eq!(stats.max_supply.to_string(), "4611686018427387903 TKN");

    // patch the amount to 2^62 in the packed arguments
    let mut args = args;
    args[8..16].copy_from_slice(&4611686018427387904i64.to_le_bytes());
    t.push_action_require_exception(
        "create",
        &args,
        &[CONTRACT],
        "magnitude of asset amount must be less than 2^62",
    );
    let err = t.push_action("create", &args, &[CONTRACT]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAsset);
}

#[test]
fn it_creates_with_the_most_decimals() {
    let mut t = init_test();
    let args = create_args("alice", "1.000000000000000000 TKN");
    t.push_action("create", &args, &[CONTRACT]).unwrap();
    let stats = t.get_stats("TKN").unwrap();
    assert_eq!(stats.supply.to_string(), "0.000000000000000000 TKN");
    assert_eq!(stats.max_supply.to_string(), "1.000000000000000000 TKN");
    assert_eq!(stats.issuer, name("alice"));

    // 1.0000000000000000000 at 18 decimals is 10^19
    let mut args = args;
    args[8..16].copy_from_slice(&0x8ac7230489e80000u64.to_le_bytes());
    t.push_action_require_exception(
        "create",
        &args,
        &[CONTRACT],
        "magnitude of asset amount must be less than 2^62",
    );
}

#[test]
fn it_issues() {
    let mut t = init_test();
    t.push_action("create", &create_args("alice", "1000.000 TKN"), &[CONTRACT]).unwrap();
    t.push_action("issue", &issue_args("alice", "500.000 TKN", "hola"), &["alice"]).unwrap();

    let stats = t.get_stats("TKN").unwrap();
    assert_eq!(stats.supply.to_string(), "500.000 TKN");
    assert_eq!(stats.max_supply.to_string(), "1000.000 TKN");
    assert_eq!(t.balance("alice", "TKN").unwrap(), "500.000 TKN");

    t.push_action_require_exception(
        "issue",
        &issue_args("alice", "500.001 TKN", "hola"),
        &["alice"],
        "quantity exceeds available supply",
    );
    t.push_action_require_exception(
        "issue",
        &issue_args("alice", "1.000 ABC", "hola"),
        &["alice"],
        "token with symbol does not exist, create token before issue",
    );
}

#[test]
fn it_retires() {
    let mut t = init_test();
    t.push_action("create", &create_args("alice", "1000.000 TKN"), &[CONTRACT]).unwrap();
    t.push_action("issue", &issue_args("alice", "500.000 TKN", "hola"), &["alice"]).unwrap();
    assert_eq!(t.get_stats("TKN").unwrap().supply.to_string(), "500.000 TKN");
    assert_eq!(t.balance("alice", "TKN").unwrap(), "500.000 TKN");

    t.push_action("retire", &retire_args("200.000 TKN", "hola"), &["alice"]).unwrap();
    let stats = t.get_stats("TKN").unwrap();
    assert_eq!(stats.supply.to_string(), "300.000 TKN");
    assert_eq!(stats.max_supply.to_string(), "1000.000 TKN");
    assert_eq!(t.balance("alice", "TKN").unwrap(), "300.000 TKN");

    t.push_action_require_exception(
        "retire",
        &retire_args("500.000 TKN", "hola"),
        &["alice"],
        "overdrawn balance",
    );

    t.push_action("transfer", &transfer_args("alice", "bob", "200.000 TKN", "hola"), &["alice"])
        .unwrap();
    // the tokens are no longer on the issuer's balance
    t.push_action_require_exception(
        "retire",
        &retire_args("300.000 TKN", "hola"),
        &["alice"],
        "overdrawn balance",
    );

    // transfer tokens back
    t.push_action("transfer", &transfer_args("bob", "alice", "200.000 TKN", "hola"), &["bob"])
        .unwrap();
    t.push_action("retire", &retire_args("300.000 TKN", "hola"), &["alice"]).unwrap();

    let stats = t.get_stats("TKN").unwrap();
    assert_eq!(stats.supply.to_string(), "0.000 TKN");
    assert_eq!(stats.max_supply.to_string(), "1000.000 TKN");
    assert_eq!(t.balance("alice", "TKN").unwrap(), "0.000 TKN");

    // nothing left to retire
    t.push_action_require_exception(
        "retire",
        &retire_args("1.000 TKN", "hola"),
        &["alice"],
        "overdrawn balance",
    );
}

#[test]
fn it_transfers() {
    let mut t = init_test();
    t.push_action("create", &create_args("alice", "1000 CERO"), &[CONTRACT]).unwrap();
    t.push_action("issue", &issue_args("alice", "1000 CERO", "hola"), &["alice"]).unwrap();

    let stats = t.get_stats("CERO").unwrap();
    assert_eq!(stats.supply.to_string(), "1000 CERO");
    assert_eq!(stats.max_supply.to_string(), "1000 CERO");
    assert_eq!(t.balance("alice", "CERO").unwrap(), "1000 CERO");

    t.push_action("transfer", &transfer_args("alice", "bob", "300 CERO", "hola"), &["alice"])
        .unwrap();
    assert_eq!(t.balance("alice", "CERO").unwrap(), "700 CERO");
    assert_eq!(t.balance("bob", "CERO").unwrap(), "300 CERO");
    assert_eq!(t.notified, vec![name("alice"), name("bob")]);
    // the sender paid for bob's row
    assert_eq!(t.get_accounts("bob")[0].payer, name("alice"));

    t.push_action_require_exception(
        "transfer",
        &transfer_args("alice", "bob", "701 CERO", "hola"),
        &["alice"],
        "overdrawn balance",
    );
    t.push_action_require_exception(
        "transfer",
        &transfer_args("alice", "bob", "-1000 CERO", "hola"),
        &["alice"],
        "must transfer positive quantity",
    );
    t.push_action_require_exception(
        "transfer",
        &transfer_args("alice", "alice", "1 CERO", "hola"),
        &["alice"],
        "cannot transfer to self",
    );
    t.push_action_require_exception(
        "transfer",
        &transfer_args("alice", "bob", "1 CERO", "hola"),
        &["bob"],
        "missing authority of alice",
    );

    // sending the whole balance keeps the row
    t.push_action("transfer", &transfer_args("alice", "bob", "700 CERO", "hola"), &["alice"])
        .unwrap();
    assert_eq!(t.balance("alice", "CERO").unwrap(), "0 CERO");
    assert_eq!(t.balance("bob", "CERO").unwrap(), "1000 CERO");
}

#[test]
fn it_opens_balances() {
    let mut t = init_test();
    t.push_action("create", &create_args("alice", "1000 CERO"), &[CONTRACT]).unwrap();
    assert!(t.get_accounts("bob").is_empty());

    t.push_action_require_exception(
        "issue",
        &issue_args("bob", "1000 CERO", "hola"),
        &["alice"],
        "tokens can only be issued to issuer account",
    );
    t.push_action("issue", &issue_args("alice", "1000 CERO", "hola"), &["alice"]).unwrap();
    assert_eq!(t.balance("alice", "CERO").unwrap(), "1000 CERO");
    assert!(t.get_accounts("bob").is_empty());

    t.push_action_require_exception(
        "open",
        &open_args("nonexistent", "0,CERO", "alice"),
        &["alice"],
        "owner account does not exist",
    );

    t.push_action("open", &open_args("bob", "0,CERO", "alice"), &["alice"]).unwrap();
    assert_eq!(t.balance("bob", "CERO").unwrap(), "0 CERO");
    assert_eq!(t.get_accounts("bob")[0].payer, name("alice"));

    // opening again changes nothing
    let root = t.root();
    t.push_action("open", &open_args("bob", "0,CERO", "alice"), &["alice"]).unwrap();
    assert_eq!(t.root(), root);
    assert_eq!(t.get_accounts("bob").len(), 1);

    t.push_action("transfer", &transfer_args("alice", "bob", "200 CERO", "hola"), &["alice"])
        .unwrap();
    assert_eq!(t.balance("bob", "CERO").unwrap(), "200 CERO");

    t.push_action_require_exception(
        "open",
        &open_args("testmetestme", "0,INVALID", "alice"),
        &["alice"],
        "symbol does not exist",
    );
    t.push_action_require_exception(
        "open",
        &open_args("testmetestme", "1,CERO", "alice"),
        &["alice"],
        "symbol precision mismatch",
    );
}

#[test]
fn it_closes_balances() {
    let mut t = init_test();
    t.push_action("create", &create_args("alice", "1000 CERO"), &[CONTRACT]).unwrap();
    assert!(t.get_accounts("alice").is_empty());

    t.push_action("issue", &issue_args("alice", "1000 CERO", "hola"), &["alice"]).unwrap();
    assert_eq!(t.balance("alice", "CERO").unwrap(), "1000 CERO");

    t.push_action_require_exception(
        "close",
        &close_args("alice", "0,CERO"),
        &["alice"],
        "Cannot close because the balance is not zero.",
    );

    t.push_action("transfer", &transfer_args("alice", "bob", "1000 CERO", "hola"), &["alice"])
        .unwrap();
    assert_eq!(t.balance("alice", "CERO").unwrap(), "0 CERO");

    t.push_action("close", &close_args("alice", "0,CERO"), &["alice"]).unwrap();
    assert!(t.get_accounts("alice").is_empty());

    t.push_action_require_exception(
        "close",
        &close_args("alice", "0,CERO"),
        &["alice"],
        "Balance row already deleted or never existed. Action won't have any effect.",
    );
}

#[test]
fn it_rejects_unknown_actions_and_bad_data() {
    let mut t = init_test();
    t.push_action_require_exception("mint", &[], &[CONTRACT], "unknown action mint");

    let mut args = create_args("alice", "1000 CERO");
    args.truncate(20);
    let err = t.push_action("create", &args, &[CONTRACT]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert!(t.get_stats("CERO").is_none());
}
