use super::{NodeRef, NodeType};

impl NodeRef<'_> {
    /// Structural equality. Object children are matched by key, array
    /// children by position, scalars by their raw bytes.
    pub fn equal_with(&self, other: &NodeRef<'_>) -> bool {
        equal(*self, *other)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        equal(*self, *other)
    }
}

fn equal(a: NodeRef<'_>, b: NodeRef<'_>) -> bool {
    let (a, b) = (a.resolve(), b.resolve());
    if a.kind() != b.kind() {
        return false;
    }
    if a.children_len() != b.children_len() {
        return false;
    }
    match a.kind() {
        NodeType::Object => a.children().all(|ac| {
            let attribute = ac.kind() == NodeType::Attribute;
            let key = ac.key_bytes();
            b.children()
                .find(|bc| {
                    (bc.kind() == NodeType::Attribute) == attribute
                        && bc.key_bytes().as_ref() == key.as_ref()
                })
                .is_some_and(|bc| equal(ac, bc))
        }),
        NodeType::Array => a.children().zip(b.children()).all(|(ac, bc)| equal(ac, bc)),
        NodeType::Null | NodeType::Unknown => true,
        _ => a.value().raw_bytes(a.arena()) == b.value().raw_bytes(b.arena()),
    }
}
