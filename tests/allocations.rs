//! Kept in its own test binary: the counting allocator sees every thread.

use std::alloc::{GlobalAlloc, Layout, System};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use xmlwriter::{
    Attribute, CData, Comment, DocType, Document, DtdAttList, DtdAttr, DtdAttrDefault, DtdAttrType, DtdElement,
    DtdEntity, Element, NodeKind, Notation, ProcessingInstruction, Result, Writer, WriterConfig,
};

struct CountingAllocator;

static COUNTING: AtomicBool = AtomicBool::new(false);
static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNTING.load(Ordering::SeqCst) {
            ALLOCATIONS.fetch_add(1, Ordering::SeqCst);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn write_document(w: &mut Writer<io::Sink>) -> Result<()> {
    w.start_document(Document::new())?;

    w.start_doctype(DocType::new("foo").system_id("foo.dtd"))?;
    w.write_notation(Notation::new("gif").public_id("image/gif"))?;
    w.write_dtd_element(DtdElement::new("foo", DtdElement::ANY))?;
    w.write_dtd_element(DtdElement::new("bar", DtdElement::PCDATA))?;
    w.write_dtd_entity(DtdEntity::new("hi").content("hello"))?;
    w.write_dtd_entity(DtdEntity::new("logo").system_id("logo.gif").ndata("gif"))?;
    w.write_dtd_att_list(DtdAttList::new("foo").attrs(&[DtdAttr::new("a", DtdAttrType::CData)]))?;
    w.start_dtd_att_list(DtdAttList::new("bar"))?;
    w.write_dtd_attr(DtdAttr::new("id", DtdAttrType::Id).default_decl(DtdAttrDefault::Required))?;
    w.write_dtd_attr(DtdAttr::new("v", DtdAttrType::NmToken).default_decl(DtdAttrDefault::Fixed("1")))?;
    w.end_dtd_att_list()?;
    w.write_comment(Comment::new("inside the doctype"))?;
    w.end_doctype()?;

    w.write_pi(ProcessingInstruction::new("app", "run"))?;
    w.start_element(Element::new("foo"))?;
    w.start_element(Element::new("bar"))?;
    w.write_attribute(Attribute::new("a", "").bool(true))?;
    w.write_text("hello & <goodbye>")?;
    w.start_element(Element::new("baz"))?;
    w.write_comment(Comment::new("this is a comment"))?;
    w.start_comment(Comment::new("pending"))?;
    w.write_comment_content(" and more")?;
    w.end_comment()?;
    w.write_cdata(CData::new("pants pants revolution"))?;
    w.start_cdata(CData::new("a]"))?;
    w.write_cdata_content("]b")?;
    w.end_cdata()?;
    w.write_raw("pants pants revolution")?;
    w.write_pi(ProcessingInstruction::new("app", ""))?;
    w.end_named(NodeKind::Element, "baz")?;
    w.end_element_full()?;
    w.write_element(Element::new("qux").attrs(&[Attribute::new("k", "v &").namespace("p", "urn:p")]))?;
    w.write_element(
        Element::new("quux")
            .namespace("q", "urn:q")
            .content(&[Comment::new("child").into(), "text".into()]),
    )?;
    w.end_doc()
}

fn count_allocations(w: &mut Writer<io::Sink>) -> usize {
    write_document(w).unwrap();

    ALLOCATIONS.store(0, Ordering::SeqCst);
    COUNTING.store(true, Ordering::SeqCst);
    let result = write_document(w);
    COUNTING.store(false, Ordering::SeqCst);

    result.unwrap();
    ALLOCATIONS.load(Ordering::SeqCst)
}

#[test]
fn steady_state_writes_do_not_allocate() {
    let mut plain = Writer::new(io::sink());
    assert_eq!(count_allocations(&mut plain), 0);

    let mut indented = WriterConfig::new().perform_indent(true).create_writer(io::sink());
    assert_eq!(count_allocations(&mut indented), 0);
}
