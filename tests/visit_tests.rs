use std::ops::ControlFlow;

use na_bson::{BinarySubtype, Document, Iter, Oid, Visit};

#[derive(Default)]
struct Collector {
    seen: Vec<String>,
    corrupt_at: Option<u32>,
}

impl Visit for Collector {
    fn visit_double(&mut self, key: &str, value: f64) -> ControlFlow<()> {
        self.seen.push(format!("{key}=double:{value}"));
        ControlFlow::Continue(())
    }
    fn visit_utf8(&mut self, key: &str, value: &[u8]) -> ControlFlow<()> {
        self.seen
            .push(format!("{key}=utf8:{}", String::from_utf8_lossy(value)));
        ControlFlow::Continue(())
    }
    fn visit_int32(&mut self, key: &str, value: i32) -> ControlFlow<()> {
        self.seen.push(format!("{key}=int32:{value}"));
        ControlFlow::Continue(())
    }
    fn visit_bool(&mut self, key: &str, value: bool) -> ControlFlow<()> {
        self.seen.push(format!("{key}=bool:{value}"));
        ControlFlow::Continue(())
    }
    fn visit_document(&mut self, key: &str, _value: &[u8]) -> ControlFlow<()> {
        self.seen.push(format!("{key}=document"));
        ControlFlow::Continue(())
    }
    fn visit_binary(&mut self, key: &str, subtype: BinarySubtype, value: &[u8]) -> ControlFlow<()> {
        self.seen
            .push(format!("{key}=binary:{:?}:{}", subtype, value.len()));
        ControlFlow::Continue(())
    }
    fn visit_null(&mut self, key: &str) -> ControlFlow<()> {
        self.seen.push(format!("{key}=null"));
        ControlFlow::Continue(())
    }
    fn visit_corrupt(&mut self, offset: u32) {
        self.corrupt_at = Some(offset);
    }
}

#[test]
fn visits_every_field_in_order() {
    let mut doc = Document::new();
    doc.append_int32("a", 1).unwrap();
    doc.append_utf8("b", "two").unwrap();
    doc.append_double("c", 3.0).unwrap();
    doc.append_bool("d", false).unwrap();
    doc.append_null("e").unwrap();
    doc.append_binary("f", BinarySubtype::Generic, &[1, 2])
        .unwrap();

    let mut collector = Collector::default();
    let flow = doc.iter().visit_all(&mut collector);
    assert_eq!(flow, ControlFlow::Continue(()));
    assert_eq!(
        collector.seen,
        [
            "a=int32:1",
            "b=utf8:two",
            "c=double:3",
            "d=bool:false",
            "e=null",
            "f=binary:Generic:2",
        ]
    );
    assert_eq!(collector.corrupt_at, None);
}

#[test]
fn unhandled_types_fall_through() {
    let mut doc = Document::new();
    doc.append_oid("id", &Oid::from_bytes([1; 12])).unwrap();
    doc.append_int32("a", 1).unwrap();

    // Collector has no visit_oid override; the default continues.
    let mut collector = Collector::default();
    assert_eq!(doc.iter().visit_all(&mut collector), ControlFlow::Continue(()));
    assert_eq!(collector.seen, ["a=int32:1"]);
}

struct StopAfter {
    remaining: usize,
    seen: usize,
}

impl Visit for StopAfter {
    fn visit_int32(&mut self, _key: &str, _value: i32) -> ControlFlow<()> {
        self.seen += 1;
        if self.seen == self.remaining {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

#[test]
fn break_cancels_the_walk() {
    let mut doc = Document::new();
    for index in 0..10 {
        doc.append_int32(&index.to_string(), index).unwrap();
    }

    let mut visitor = StopAfter {
        remaining: 3,
        seen: 0,
    };
    let flow = doc.iter().visit_all(&mut visitor);
    assert_eq!(flow, ControlFlow::Break(()));
    assert_eq!(visitor.seen, 3);
}

#[test]
fn corruption_fires_visit_corrupt_and_breaks() {
    let mut doc = Document::new();
    doc.append_int32("a", 1).unwrap();
    doc.append_int32("b", 2).unwrap();
    let mut bytes = doc.into_vec();
    // Second element's type byte: offset 4 + 7 = 11.
    bytes[11] = 0x55;

    let mut collector = Collector::default();
    let mut iter = Iter::new(&bytes).unwrap();
    let flow = iter.visit_all(&mut collector);

    assert_eq!(flow, ControlFlow::Break(()));
    assert_eq!(collector.seen, ["a=int32:1"]);
    assert_eq!(collector.corrupt_at, Some(11));
    assert_eq!(iter.error_offset(), Some(11));
}

#[test]
fn invalid_utf8_key_cancels_without_corrupt_callback() {
    let mut doc = Document::new();
    doc.append_int32("ab", 1).unwrap();
    let mut bytes = doc.into_vec();
    bytes[5] = 0xFF;
    bytes[6] = 0xFE;

    let mut collector = Collector::default();
    let flow = Iter::new(&bytes).unwrap().visit_all(&mut collector);
    assert_eq!(flow, ControlFlow::Break(()));
    assert!(collector.seen.is_empty());
    assert_eq!(collector.corrupt_at, None);
}

#[test]
fn embedded_documents_are_reported_not_entered() {
    let mut doc = Document::new();
    let mut child = doc.begin_document("sub").unwrap();
    child.append_int32("inner", 1).unwrap();
    child.end();
    doc.append_int32("after", 2).unwrap();

    let mut collector = Collector::default();
    assert_eq!(doc.iter().visit_all(&mut collector), ControlFlow::Continue(()));
    // The walk is flat; recursing is the visitor's choice.
    assert_eq!(collector.seen, ["sub=document", "after=int32:2"]);
}
