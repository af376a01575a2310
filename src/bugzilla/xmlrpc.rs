//! Minimal XML-RPC codec: encodes `methodCall` documents and decodes
//! `methodResponse` documents, including faults.
use base64::{Engine, prelude::BASE64_STANDARD};
use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::collections::BTreeMap;

use crate::error::{BumpverError, Result};

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(String),
    Double(f64),
    DateTime(String),
    Base64(Vec<u8>),
    Struct(BTreeMap<String, Value>),
    Array(Vec<Value>),
    Nil,
}

impl Value {
    /// Build a struct value from `(name, value)` pairs.
    pub fn structure<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Struct(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn get(&self, member: &str) -> Option<&Value> {
        match self {
            Self::Struct(members) => members.get(member),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

fn start(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn end(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn leaf(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    start(writer, name)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

fn write_value(writer: &mut Writer<Vec<u8>>, value: &Value) -> Result<()> {
    start(writer, "value")?;

    match value {
        Value::Int(i) => leaf(writer, "int", &i.to_string())?,
        Value::Bool(b) => leaf(writer, "boolean", if *b { "1" } else { "0" })?,
        Value::String(s) => leaf(writer, "string", s)?,
        Value::Double(d) => leaf(writer, "double", &d.to_string())?,
        Value::DateTime(d) => leaf(writer, "dateTime.iso8601", d)?,
        Value::Base64(bytes) => {
            leaf(writer, "base64", &BASE64_STANDARD.encode(bytes))?
        }
        Value::Struct(members) => {
            start(writer, "struct")?;
            for (name, member) in members {
                start(writer, "member")?;
                leaf(writer, "name", name)?;
                write_value(writer, member)?;
                end(writer, "member")?;
            }
            end(writer, "struct")?;
        }
        Value::Array(items) => {
            start(writer, "array")?;
            start(writer, "data")?;
            for item in items {
                write_value(writer, item)?;
            }
            end(writer, "data")?;
            end(writer, "array")?;
        }
        Value::Nil => {
            writer.write_event(Event::Empty(BytesStart::new("nil")))?;
        }
    }

    end(writer, "value")
}

/// Encode a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    start(&mut writer, "methodCall")?;
    leaf(&mut writer, "methodName", method)?;
    start(&mut writer, "params")?;
    for param in params {
        start(&mut writer, "param")?;
        write_value(&mut writer, param)?;
        end(&mut writer, "param")?;
    }
    end(&mut writer, "params")?;
    end(&mut writer, "methodCall")?;

    Ok(String::from_utf8(writer.into_inner())?)
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn new(name: &[u8]) -> Result<Self> {
        Ok(Self {
            name: String::from_utf8(name.to_vec())?,
            ..Self::default()
        })
    }

    fn child(&self, name: &str) -> Result<&Node> {
        self.children.iter().find(|c| c.name == name).ok_or_else(|| {
            BumpverError::xmlrpc(format!(
                "<{}> is missing <{}>",
                self.name, name
            ))
        })
    }
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

fn parse_tree(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = vec![];
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Node::new(e.local_name().as_ref())?),
            Event::Empty(e) => {
                let node = Node::new(e.local_name().as_ref())?;
                attach(&mut stack, &mut root, node);
            }
            Event::Text(t) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text
                        .push_str(&String::from_utf8(c.into_inner().into_owned())?);
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| BumpverError::xmlrpc("unbalanced document"))?;
                attach(&mut stack, &mut root, node);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or_else(|| BumpverError::xmlrpc("empty document"))
}

fn parse_number<T: std::str::FromStr>(node: &Node) -> Result<T> {
    node.text.trim().parse::<T>().map_err(|_| {
        BumpverError::xmlrpc(format!("invalid <{}>: {}", node.name, node.text))
    })
}

fn decode_value(node: &Node) -> Result<Value> {
    let Some(typed) = node.children.first() else {
        // untyped values are strings
        return Ok(Value::String(node.text.clone()));
    };

    let value = match typed.name.as_str() {
        "int" | "i4" | "i8" => Value::Int(parse_number(typed)?),
        "boolean" => match typed.text.trim() {
            "1" => Value::Bool(true),
            "0" => Value::Bool(false),
            other => {
                return Err(BumpverError::xmlrpc(format!(
                    "invalid <boolean>: {other}"
                )));
            }
        },
        "string" => Value::String(typed.text.clone()),
        "double" => Value::Double(parse_number(typed)?),
        "dateTime.iso8601" => Value::DateTime(typed.text.trim().to_string()),
        "base64" => {
            let encoded: String =
                typed.text.chars().filter(|c| !c.is_whitespace()).collect();
            Value::Base64(BASE64_STANDARD.decode(encoded)?)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.child("name")?.text.clone();
                let value = decode_value(member.child("value")?)?;
                members.insert(name, value);
            }
            Value::Struct(members)
        }
        "array" => {
            let items = typed
                .child("data")?
                .children
                .iter()
                .filter(|c| c.name == "value")
                .map(decode_value)
                .collect::<Result<Vec<Value>>>()?;
            Value::Array(items)
        }
        "nil" => Value::Nil,
        other => {
            return Err(BumpverError::xmlrpc(format!(
                "unsupported value type <{other}>"
            )));
        }
    };

    Ok(value)
}

/// Decode a `methodResponse` document into its single return value.
///
/// A `<fault>` response is returned as [`BumpverError::Fault`].
pub fn decode_response(xml: &str) -> Result<Value> {
    let root = parse_tree(xml)?;

    if root.name != "methodResponse" {
        return Err(BumpverError::xmlrpc(format!(
            "expected <methodResponse>, found <{}>",
            root.name
        )));
    }

    if let Ok(fault) = root.child("fault") {
        let fault = decode_value(fault.child("value")?)?;
        let code = fault.get("faultCode").and_then(Value::as_i64).unwrap_or(0);
        let message = fault
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        return Err(BumpverError::Fault { code, message });
    }

    let param = root.child("params")?.child("param")?;

    decode_value(param.child("value")?)
}
