// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_directory_lookup() {
    let users = FakeUserDirectory::new();
    users.add("a", "Ada", "ada@example.com");

    assert_eq!(users.lookup("a").await.unwrap().unwrap().name, "Ada");
    assert_eq!(users.lookup("b").await.unwrap(), None);

    users.set_failing(true);
    assert!(users.lookup("a").await.is_err());
    assert_eq!(users.lookups(), vec!["a", "b", "a"]);
}
