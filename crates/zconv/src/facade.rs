//! Stateful converter holding one document in several representations
//!
//! A [`Converter`] keeps the most recent node tree next to the XML, JSON and
//! CSV text it was produced from or rendered to. Each conversion reads one
//! slot and fills another; asking for a slot that was never filled fails
//! with [`ErrorKind::MissingData`](crate::ErrorKind::MissingData).
//!
//! A converter is not meant to be shared between threads. Every operation
//! takes `&mut self`, so only one conversion can be in flight per instance.

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::convert::{self, ConvertOptions, DEFAULT_ROW_TAG};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::store::{FileStore, FsStore};
use crate::{csv, json, xml};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Xml,
    Json,
    Csv,
}

impl Slot {
    const fn name(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Converter facade over a [`FileStore`]
#[derive(Debug, Default)]
pub struct Converter<S: FileStore = FsStore> {
    store: S,
    options: ConvertOptions,
    node: Option<Node>,
    xml: Option<String>,
    json: Option<String>,
    csv: Option<String>,
    root_tag: Option<String>,
}

impl Converter<FsStore> {
    /// Converter reading and writing through the local filesystem
    pub fn new() -> Self {
        Self::with_store(FsStore)
    }
}

impl<S: FileStore> Converter<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            options: ConvertOptions::default(),
            node: None,
            xml: None,
            json: None,
            csv: None,
            root_tag: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ConvertOptions {
        &mut self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // Slot access

    pub fn node(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    pub fn xml(&self) -> Option<&str> {
        self.xml.as_deref()
    }

    pub fn json(&self) -> Option<&str> {
        self.json.as_deref()
    }

    pub fn csv(&self) -> Option<&str> {
        self.csv.as_deref()
    }

    /// Tag of the document element seen by the last successful XML decode
    pub fn root_tag(&self) -> Option<&str> {
        self.root_tag.as_deref()
    }

    pub fn set_node(&mut self, node: Node) {
        self.node = Some(node);
    }

    pub fn set_xml(&mut self, xml: impl Into<String>) {
        self.xml = Some(xml.into());
    }

    pub fn set_json(&mut self, json: impl Into<String>) {
        self.json = Some(json.into());
    }

    pub fn set_csv(&mut self, csv: impl Into<String>) {
        self.csv = Some(csv.into());
    }

    // File operations

    pub fn load_xml(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load(Slot::Xml, path.as_ref())
    }

    pub fn save_xml(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save(Slot::Xml, path.as_ref())
    }

    pub fn load_json(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load(Slot::Json, path.as_ref())
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save(Slot::Json, path.as_ref())
    }

    pub fn load_csv(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load(Slot::Csv, path.as_ref())
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save(Slot::Csv, path.as_ref())
    }

    #[instrument(skip(self))]
    fn load(&mut self, slot: Slot, path: &Path) -> Result<()> {
        let bytes = self.store.read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| Error::io(format!("{} is not valid utf-8", path.display())))?;
        *self.slot_mut(slot) = Some(text);
        Ok(())
    }

    #[instrument(skip(self))]
    fn save(&self, slot: Slot, path: &Path) -> Result<()> {
        let text = self.text(slot)?;
        self.store.write(path, text.as_bytes())
    }

    // Conversions

    /// Decode the XML slot into the node slot.
    ///
    /// Malformed XML does not fail: the node slot receives the
    /// `{"xml_error": "true"}` marker instead.
    pub fn xml_to_node(&mut self) -> Result<&Node> {
        let text = self.text(Slot::Xml)?;
        let node = match xml::decode_document(text, &self.options.xml) {
            Ok(decoded) => {
                self.root_tag = Some(decoded.root);
                decoded.node
            }
            Err(err) => {
                warn!(error = %err, "malformed xml, storing error marker");
                self.root_tag = None;
                Node::xml_error()
            }
        };
        Ok(&*self.node.insert(node))
    }

    /// Encode the node slot into the XML slot.
    ///
    /// Without an explicit `root_tag` the root of the last decoded XML
    /// document is reused, then the configured default.
    pub fn node_to_xml(&mut self, root_tag: Option<&str>) -> Result<&str> {
        let config = self.options.xml.clone();
        self.write_xml(root_tag, config)
    }

    pub fn json_to_node(&mut self) -> Result<&Node> {
        let node = json::decode(self.text(Slot::Json)?)?;
        Ok(&*self.node.insert(node))
    }

    pub fn node_to_json(&mut self) -> Result<&str> {
        let text = json::encode_with_config(self.current_node()?, self.options.json)?;
        Ok(self.json.insert(text).as_str())
    }

    pub fn xml_to_json(&mut self) -> Result<&str> {
        self.xml_to_node()?;
        self.node_to_json()
    }

    pub fn json_to_xml(&mut self, root_tag: Option<&str>) -> Result<&str> {
        self.json_to_node()?;
        self.node_to_xml(root_tag)
    }

    pub fn csv_to_node(&mut self) -> Result<&Node> {
        let node = csv::decode(self.text(Slot::Csv)?, &self.options.csv)?;
        Ok(&*self.node.insert(node))
    }

    /// Encode the node slot as CSV; a decoded `{row: [...]}` document is
    /// written as its rows
    pub fn node_to_csv(&mut self) -> Result<&str> {
        let rows = convert::table_rows(self.current_node()?);
        let text = csv::encode(&rows, &self.options.csv)?;
        Ok(self.csv.insert(text).as_str())
    }

    pub fn xml_to_csv(&mut self) -> Result<&str> {
        self.xml_to_node()?;
        self.node_to_csv()
    }

    /// Write the CSV slot as XML with one `<row>` element per record unless
    /// an item tag is configured
    pub fn csv_to_xml(&mut self, root_tag: Option<&str>) -> Result<&str> {
        self.csv_to_node()?;
        let mut config = self.options.xml.clone();
        if config.item_tag.is_none() {
            config.item_tag = Some(DEFAULT_ROW_TAG.to_string());
        }
        self.write_xml(root_tag, config)
    }

    fn write_xml(&mut self, root_tag: Option<&str>, config: xml::XmlConfig) -> Result<&str> {
        let root_tag = root_tag
            .or(self.root_tag.as_deref())
            .unwrap_or(&self.options.root_tag)
            .to_string();
        let text = xml::encode_with_config(self.current_node()?, &root_tag, &config)?;
        debug!(root = %root_tag, "stored xml text");
        Ok(self.xml.insert(text).as_str())
    }

    fn current_node(&self) -> Result<&Node> {
        self.node.as_ref().ok_or_else(|| convert::missing("node"))
    }

    fn text(&self, slot: Slot) -> Result<&str> {
        let text = match slot {
            Slot::Xml => self.xml.as_deref(),
            Slot::Json => self.json.as_deref(),
            Slot::Csv => self.csv.as_deref(),
        };
        text.ok_or_else(|| convert::missing(slot.name()))
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<String> {
        match slot {
            Slot::Xml => &mut self.xml,
            Slot::Json => &mut self.json,
            Slot::Csv => &mut self.csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[derive(Default)]
    struct MemStore {
        files: RefCell<HashMap<PathBuf, Vec<u8>>>,
    }

    impl FileStore for MemStore {
        fn read(&self, path: &Path) -> Result<Vec<u8>> {
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| Error::io(format!("no file {}", path.display())))
        }

        fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), content.to_vec());
            Ok(())
        }
    }

    fn converter() -> Converter<MemStore> {
        Converter::with_store(MemStore::default())
    }

    #[test]
    fn test_empty_slots_report_missing_data() {
        let mut conv = converter();
        let kind = |r: Result<&str>| r.err().map(|e| e.kind().clone());
        assert_eq!(
            kind(conv.node_to_json()),
            Some(ErrorKind::MissingData { slot: "node" })
        );
        assert_eq!(
            conv.xml_to_node().err().map(|e| e.kind().clone()),
            Some(ErrorKind::MissingData { slot: "xml" })
        );
        assert_eq!(
            conv.save_csv("out.csv").err().map(|e| e.kind().clone()),
            Some(ErrorKind::MissingData { slot: "csv" })
        );
    }

    #[test]
    fn test_malformed_xml_stores_marker() -> Result<()> {
        let mut conv = converter();
        conv.set_xml("<r><");
        assert!(conv.xml_to_node()?.is_xml_error());
        assert_eq!(conv.xml_to_json()?, r#"{"xml_error":"true"}"#);
        Ok(())
    }

    #[test]
    fn test_malformed_xml_forgets_previous_root() -> Result<()> {
        let mut conv = converter();
        conv.set_xml("<catalog><book>a</book></catalog>");
        conv.xml_to_node()?;
        assert_eq!(conv.root_tag(), Some("catalog"));

        conv.set_xml("<catalog><");
        conv.xml_to_node()?;
        assert_eq!(conv.root_tag(), None);
        let xml = conv.node_to_xml(None)?;
        assert!(xml.ends_with("<root><xml_error>true</xml_error></root>\n"));
        Ok(())
    }

    #[test]
    fn test_xml_root_is_reused() -> Result<()> {
        let mut conv = converter();
        conv.set_xml("<catalog><book>a</book></catalog>");
        conv.xml_to_node()?;
        assert_eq!(conv.root_tag(), Some("catalog"));
        let xml = conv.node_to_xml(None)?;
        assert!(xml.ends_with("<catalog><book>a</book></catalog>\n"));
        assert!(conv.node_to_xml(Some("shelf"))?.contains("<shelf>"));
        Ok(())
    }

    #[test]
    fn test_load_convert_save() -> Result<()> {
        let mut conv = converter();
        conv.store()
            .write(Path::new("in.json"), br#"[{"a":"1","b":"2"}]"#)?;
        conv.load_json("in.json")?;
        conv.json_to_node()?;
        conv.node_to_csv()?;
        conv.save_csv("out.csv")?;
        assert_eq!(conv.store().read(Path::new("out.csv"))?, b"a,b\n1,2\n".to_vec());
        Ok(())
    }

    #[test]
    fn test_csv_xml_round_trip() -> Result<()> {
        let mut conv = converter();
        conv.set_csv("a,b\n1,2\n3,4\n");
        let xml = conv.csv_to_xml(Some("table"))?.to_string();
        assert!(xml.contains("<table><row><a>1</a><b>2</b></row>"));

        let mut back = converter();
        back.set_xml(xml);
        assert_eq!(back.xml_to_csv()?, "a,b\n1,2\n3,4\n");
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut conv = converter();
        let kind = conv.load_xml("nope.xml").err().map(|e| e.kind().clone());
        assert_eq!(kind, Some(ErrorKind::Io));
        assert_eq!(conv.xml(), None);
    }
}
