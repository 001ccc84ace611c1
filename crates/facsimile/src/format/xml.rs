//! XML adapter built on quick-xml events.
//!
//! Mapping conventions: child elements become mapping entries, attributes
//! become `@name` entries, repeated same-named children collapse into a
//! Sequence under that name, text-only elements become String, and mixed
//! content keeps its text under `#text`. The document root is kept as a
//! single-entry mapping so its element name survives the round trip.
//! Scalar content arrives as String; typed coercion happens in inference.

use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::error::{FacsimileError, Result};
use crate::value::Value;

use super::{scalar_text, FormatAdapter};

/// Parses and renders XML documents.
pub struct XmlAdapter {
    /// Wrapper element used when serializing more than one value.
    pub root_element: String,
    /// Element used for a value whose name is not recoverable from its
    /// shape (anything but a single-entry mapping).
    pub record_element: String,
}

impl Default for XmlAdapter {
    fn default() -> Self {
        Self {
            root_element: "records".to_string(),
            record_element: "record".to_string(),
        }
    }
}

/// Partially-built element while its subtree is still open.
struct ElementBuilder {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<(String, Value)>,
    text: String,
}

impl ElementBuilder {
    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| FacsimileError::Xml(err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| FacsimileError::Xml(err.to_string()))?
                .into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
            text: String::new(),
        })
    }

    fn finish(self) -> (String, Value) {
        if self.attrs.is_empty() && self.children.is_empty() {
            let value = if self.text.is_empty() {
                Value::Null
            } else {
                Value::String(self.text)
            };
            return (self.name, value);
        }

        let mut fields: IndexMap<String, Value> = IndexMap::new();
        for (key, value) in self.attrs {
            fields.insert(format!("@{key}"), Value::String(value));
        }

        // Repeated same-named children collapse into a sequence, keeping
        // first-appearance order among distinct names.
        let mut grouped: IndexMap<String, Vec<Value>> = IndexMap::new();
        for (name, value) in self.children {
            grouped.entry(name).or_default().push(value);
        }
        for (name, mut values) in grouped {
            let value = if values.len() == 1 {
                values.pop().expect("one element")
            } else {
                Value::Sequence(values)
            };
            fields.insert(name, value);
        }

        if !self.text.is_empty() {
            fields.insert("#text".to_string(), Value::String(self.text));
        }
        (self.name, Value::Mapping(fields))
    }
}

impl FormatAdapter for XmlAdapter {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<Value>> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| FacsimileError::Xml(format!("invalid UTF-8: {e}")))?;
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<ElementBuilder> = Vec::new();
        let mut root: Option<(String, Value)> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    stack.push(ElementBuilder::from_start(e)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let (name, value) = ElementBuilder::from_start(e)?.finish();
                    attach(&mut stack, &mut root, name, value)?;
                }
                Ok(Event::Text(ref t)) => {
                    if let Some(top) = stack.last_mut() {
                        let piece = t
                            .unescape()
                            .map_err(|err| FacsimileError::Xml(err.to_string()))?;
                        top.text.push_str(&piece);
                    }
                }
                Ok(Event::End(_)) => {
                    let builder = stack.pop().ok_or_else(|| {
                        FacsimileError::Xml("unexpected closing tag".to_string())
                    })?;
                    let (name, value) = builder.finish();
                    attach(&mut stack, &mut root, name, value)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(FacsimileError::Xml(format!(
                        "parse error at position {}: {}",
                        reader.error_position(),
                        e
                    )));
                }
            }
        }

        if !stack.is_empty() {
            return Err(FacsimileError::Xml("unclosed element".to_string()));
        }
        let (name, value) = root
            .ok_or_else(|| FacsimileError::Xml("document has no root element".to_string()))?;

        debug!(root = %name, "parsed XML document");
        let mut sample = IndexMap::new();
        sample.insert(name, value);
        Ok(vec![Value::Mapping(sample)])
    }

    fn serialize(&self, values: &[Value]) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        match values {
            [single] => {
                let (name, body) = self.root_name_for(single);
                write_value(&mut writer, name, body)?;
            }
            many => {
                writer
                    .write_event(Event::Start(BytesStart::new(self.root_element.as_str())))
                    .map_err(xml_err)?;
                for value in many {
                    let (name, body) = self.root_name_for(value);
                    write_value(&mut writer, name, body)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new(self.root_element.as_str())))
                    .map_err(xml_err)?;
            }
        }
        Ok(writer.into_inner())
    }
}

impl XmlAdapter {
    /// Recover the element name for a top-level value. Parsed samples are
    /// single-entry mappings carrying their root tag; anything else gets
    /// the configured record element.
    fn root_name_for<'v>(&'v self, value: &'v Value) -> (&'v str, &'v Value) {
        if let Value::Mapping(fields) = value {
            if fields.len() == 1 {
                let (key, inner) = fields.first().expect("one entry");
                if !key.starts_with('@') && key != "#text" {
                    return (key.as_str(), inner);
                }
            }
        }
        (self.record_element.as_str(), value)
    }
}

fn attach(
    stack: &mut [ElementBuilder],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push((name, value));
        Ok(())
    } else if root.is_none() {
        *root = Some((name, value));
        Ok(())
    } else {
        Err(FacsimileError::Xml("multiple root elements".to_string()))
    }
}

fn xml_err(e: impl std::fmt::Display) -> FacsimileError {
    FacsimileError::Xml(e.to_string())
}

fn write_value(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    let name = sanitize_name(name);
    match value {
        Value::Null => writer
            .write_event(Event::Empty(BytesStart::new(name.as_str())))
            .map_err(xml_err),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            let text = scalar_text(value).expect("scalar");
            writer
                .write_event(Event::Start(BytesStart::new(name.as_str())))
                .map_err(xml_err)?;
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new(name.as_str())))
                .map_err(xml_err)
        }
        Value::Sequence(items) => {
            writer
                .write_event(Event::Start(BytesStart::new(name.as_str())))
                .map_err(xml_err)?;
            for item in items {
                write_value(writer, "item", item)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name.as_str())))
                .map_err(xml_err)
        }
        Value::Mapping(fields) => {
            let mut start = BytesStart::new(name.as_str());
            let mut body: Vec<(&String, &Value)> = Vec::new();
            for (key, field) in fields {
                match key.strip_prefix('@') {
                    Some(attr_name) => {
                        if field.is_null() {
                            continue;
                        }
                        let text = scalar_text(field).ok_or_else(|| {
                            FacsimileError::UnsupportedShape(format!(
                                "attribute '{attr_name}' holds a nested {}",
                                field.kind_name()
                            ))
                        })?;
                        start.push_attribute((sanitize_name(attr_name).as_str(), text.as_str()));
                    }
                    None => body.push((key, field)),
                }
            }

            if body.is_empty() {
                return writer.write_event(Event::Empty(start)).map_err(xml_err);
            }
            writer.write_event(Event::Start(start)).map_err(xml_err)?;
            for (key, field) in body {
                if key == "#text" {
                    let text = scalar_text(field).unwrap_or_default();
                    writer
                        .write_event(Event::Text(BytesText::new(&text)))
                        .map_err(xml_err)?;
                } else if let Value::Sequence(items) = field {
                    // Repeated elements, mirroring how parse groups them.
                    for item in items {
                        write_value(writer, key, item)?;
                    }
                } else {
                    write_value(writer, key, field)?;
                }
            }
            writer
                .write_event(Event::End(BytesEnd::new(name.as_str())))
                .map_err(xml_err)
        }
    }
}

/// Replace characters that cannot appear in an XML element name.
fn sanitize_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        out.push_str("field");
    }
    if out
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '.'))
    {
        out.insert(0, '_');
    }
    out
}
