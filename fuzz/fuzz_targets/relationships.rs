#![no_main]

use libfuzzer_sys::fuzz_target;
use symscope::symbolic::{
    BinaryRelationship, RelationshipKind, RelationshipSet, SymbolicValue, SymbolicValueFactory,
};

const KINDS: [RelationshipKind; 4] = [
    RelationshipKind::Equal,
    RelationshipKind::NotEqual,
    RelationshipKind::Less,
    RelationshipKind::LessOrEqual,
];

fuzz_target!(|data: &[u8]| {
    let mut factory = SymbolicValueFactory::new();
    let mut pool: Vec<SymbolicValue> = SymbolicValue::singletons().to_vec();
    pool.extend((0..4).map(|_| factory.create()));

    let mut set = RelationshipSet::new();
    for chunk in data.chunks_exact(3) {
        let kind = KINDS[usize::from(chunk[0]) % KINDS.len()];
        let left = pool[usize::from(chunk[1]) % pool.len()].clone();
        let right = pool[usize::from(chunk[2]) % pool.len()].clone();
        let relationship = BinaryRelationship::new(kind, left, right);

        match set.try_insert(relationship.clone()) {
            Ok(Some(next)) => {
                assert!(next.iter().all(|fact| !fact.contradicts(&relationship)));
                set = next;
            }
            Ok(None) | Err(_) => break,
        }
    }
});
