// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn uuid_gen_creates_unique_ids() {
    let id_gen = UuidIdGen::new();
    let id1 = id_gen.next();
    let id2 = id_gen.next();
    assert_ne!(id1, id2);
    assert_eq!(id1.len(), 36); // UUID format
}

#[test]
fn uuid_gen_applies_prefix() {
    let id_gen = UuidIdGen::with_prefix("slot");
    let id = id_gen.next();
    assert!(id.starts_with("slot-"));
    assert_eq!(id.len(), "slot-".len() + 36);
}

#[test]
fn sequential_gen_creates_predictable_ids() {
    let id_gen = SequentialIdGen::new("bk");
    assert_eq!(id_gen.next(), "bk-1");
    assert_eq!(id_gen.next(), "bk-2");
    assert_eq!(id_gen.next(), "bk-3");
}

#[test]
fn sequential_gen_is_cloneable_and_shared() {
    let id_gen1 = SequentialIdGen::new("slot");
    let id_gen2 = id_gen1.clone();
    assert_eq!(id_gen1.next(), "slot-1");
    assert_eq!(id_gen2.next(), "slot-2");
    assert_eq!(id_gen1.next(), "slot-3");
}
