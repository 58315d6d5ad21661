use thrift::protocol::{
    field_id, TFieldIdentifier, TInputProtocol, TOutputProtocol, TStructIdentifier, TType,
};
use thrift::{ProtocolError, ProtocolErrorKind};
use typed_builder::TypedBuilder;

use crate::model::endpoint::Endpoint;

/// A point-in-time milestone marker on a span, e.g. "cs" when the client
/// sent the request.
#[derive(TypedBuilder, Clone, Debug, PartialEq)]
pub struct Annotation {
    /// Microseconds since the epoch.
    pub timestamp: i64,
    /// Milestone label, drawn from the fixed protocol vocabulary.
    #[builder(setter(into))]
    pub value: String,
    /// The endpoint that observed the event.
    #[builder(default)]
    pub host: Option<Endpoint>,
}

impl Annotation {
    pub(crate) fn write_to_out_protocol(
        &self,
        o_prot: &mut dyn TOutputProtocol,
    ) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("Annotation"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("timestamp", TType::I64, 1))?;
        o_prot.write_i64(self.timestamp)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("value", TType::String, 2))?;
        o_prot.write_string(&self.value)?;
        o_prot.write_field_end()?;
        if let Some(host) = &self.host {
            o_prot.write_field_begin(&TFieldIdentifier::new("host", TType::Struct, 3))?;
            host.write_to_out_protocol(o_prot)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }

    pub(crate) fn read_from_in_protocol(
        i_prot: &mut dyn TInputProtocol,
    ) -> thrift::Result<Annotation> {
        i_prot.read_struct_begin()?;
        let mut timestamp = 0i64;
        let mut value = String::new();
        let mut host = None;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => timestamp = i_prot.read_i64()?,
                2 => value = i_prot.read_string()?,
                3 => host = Some(Endpoint::read_from_in_protocol(i_prot)?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(Annotation {
            timestamp,
            value,
            host,
        })
    }
}

/// Wire type tag carried by every binary annotation value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum AnnotationType {
    /// Boolean value.
    Bool = 0,
    /// Raw bytes.
    Bytes = 1,
    /// 16-bit integer.
    I16 = 2,
    /// 32-bit integer.
    I32 = 3,
    /// 64-bit integer.
    I64 = 4,
    /// Double-precision float.
    Double = 5,
    /// UTF-8 string. Every value the reporter emits is coerced to this.
    String = 6,
}

impl TryFrom<i32> for AnnotationType {
    type Error = thrift::Error;

    fn try_from(raw: i32) -> thrift::Result<Self> {
        match raw {
            0 => Ok(AnnotationType::Bool),
            1 => Ok(AnnotationType::Bytes),
            2 => Ok(AnnotationType::I16),
            3 => Ok(AnnotationType::I32),
            4 => Ok(AnnotationType::I64),
            5 => Ok(AnnotationType::Double),
            6 => Ok(AnnotationType::String),
            _ => Err(thrift::Error::Protocol(ProtocolError::new(
                ProtocolErrorKind::InvalidData,
                format!("unknown annotation type {raw}"),
            ))),
        }
    }
}

/// A key/value pair on a span, used for tags and rendered log payloads.
#[derive(TypedBuilder, Clone, Debug, PartialEq)]
pub struct BinaryAnnotation {
    /// Tag name or `event@timestamp` key for logs.
    #[builder(setter(into))]
    pub key: String,
    /// Coerced value bytes.
    pub value: Vec<u8>,
    /// Wire type of `value`.
    #[builder(default = AnnotationType::String)]
    pub annotation_type: AnnotationType,
    /// The endpoint that produced the pair.
    #[builder(default)]
    pub host: Option<Endpoint>,
}

impl BinaryAnnotation {
    pub(crate) fn write_to_out_protocol(
        &self,
        o_prot: &mut dyn TOutputProtocol,
    ) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("BinaryAnnotation"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("key", TType::String, 1))?;
        o_prot.write_string(&self.key)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("value", TType::String, 2))?;
        o_prot.write_bytes(&self.value)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("annotation_type", TType::I32, 3))?;
        o_prot.write_i32(self.annotation_type as i32)?;
        o_prot.write_field_end()?;
        if let Some(host) = &self.host {
            o_prot.write_field_begin(&TFieldIdentifier::new("host", TType::Struct, 4))?;
            host.write_to_out_protocol(o_prot)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }

    pub(crate) fn read_from_in_protocol(
        i_prot: &mut dyn TInputProtocol,
    ) -> thrift::Result<BinaryAnnotation> {
        i_prot.read_struct_begin()?;
        let mut key = String::new();
        let mut value = Vec::new();
        let mut annotation_type = AnnotationType::String;
        let mut host = None;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => key = i_prot.read_string()?,
                2 => value = i_prot.read_bytes()?,
                3 => annotation_type = AnnotationType::try_from(i_prot.read_i32()?)?,
                4 => host = Some(Endpoint::read_from_in_protocol(i_prot)?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(BinaryAnnotation {
            key,
            value,
            annotation_type,
            host,
        })
    }
}
