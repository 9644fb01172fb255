use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};

/// 序列化文档
pub fn serialize_document(dom: &RcDom, document_encoding: &str) -> std::io::Result<Vec<u8>> {
    let mut buf = serialize_node(&dom.document)?.into_bytes();

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            buf = data.to_vec();
        }
    }

    Ok(buf)
}

/// 将节点的子树序列化为 HTML 字符串（不含节点自身）
pub fn serialize_node(node: &Handle) -> std::io::Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
