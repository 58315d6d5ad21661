use thrift::protocol::{
    field_id, TBinaryInputProtocol, TBinaryOutputProtocol, TFieldIdentifier, TInputProtocol,
    TListIdentifier, TOutputProtocol, TStructIdentifier, TType,
};
use typed_builder::TypedBuilder;

use crate::model::annotation::{Annotation, BinaryAnnotation};
use crate::Error;

/// The wire-ready representation of one finished span.
///
/// Identifiers are the signed reinterpretation of the unsigned values the
/// instrumentation layer generates (see [`crate::id`]). Immutable once built;
/// owned exclusively by the recorder's buffer until handed to the transport.
#[derive(TypedBuilder, Clone, Debug, PartialEq)]
pub struct Span {
    /// Trace identifier, signed wire form.
    pub trace_id: i64,
    /// Operation name.
    #[builder(setter(into))]
    pub name: String,
    /// Span identifier, signed wire form.
    pub id: i64,
    /// Parent span identifier, absent for trace roots.
    #[builder(default)]
    pub parent_id: Option<i64>,
    /// Milestone annotations, in synthesis order.
    #[builder(default)]
    pub annotations: Vec<Annotation>,
    /// Tag and log payload annotations, in input order.
    #[builder(default)]
    pub binary_annotations: Vec<BinaryAnnotation>,
    /// Debug flag requesting collector-side trace retention.
    #[builder(default)]
    pub debug: bool,
}

impl Span {
    pub(crate) fn write_to_out_protocol(
        &self,
        o_prot: &mut dyn TOutputProtocol,
    ) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("Span"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("trace_id", TType::I64, 1))?;
        o_prot.write_i64(self.trace_id)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("name", TType::String, 3))?;
        o_prot.write_string(&self.name)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("id", TType::I64, 4))?;
        o_prot.write_i64(self.id)?;
        o_prot.write_field_end()?;
        if let Some(parent_id) = self.parent_id {
            o_prot.write_field_begin(&TFieldIdentifier::new("parent_id", TType::I64, 5))?;
            o_prot.write_i64(parent_id)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_begin(&TFieldIdentifier::new("annotations", TType::List, 6))?;
        o_prot.write_list_begin(&TListIdentifier::new(
            TType::Struct,
            self.annotations.len() as i32,
        ))?;
        for annotation in &self.annotations {
            annotation.write_to_out_protocol(o_prot)?;
        }
        o_prot.write_list_end()?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("binary_annotations", TType::List, 8))?;
        o_prot.write_list_begin(&TListIdentifier::new(
            TType::Struct,
            self.binary_annotations.len() as i32,
        ))?;
        for binary_annotation in &self.binary_annotations {
            binary_annotation.write_to_out_protocol(o_prot)?;
        }
        o_prot.write_list_end()?;
        o_prot.write_field_end()?;
        if self.debug {
            o_prot.write_field_begin(&TFieldIdentifier::new("debug", TType::Bool, 9))?;
            o_prot.write_bool(self.debug)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }

    pub(crate) fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Span> {
        i_prot.read_struct_begin()?;
        let mut trace_id = 0i64;
        let mut name = String::new();
        let mut id = 0i64;
        let mut parent_id = None;
        let mut annotations = Vec::new();
        let mut binary_annotations = Vec::new();
        let mut debug = false;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => trace_id = i_prot.read_i64()?,
                3 => name = i_prot.read_string()?,
                4 => id = i_prot.read_i64()?,
                5 => parent_id = Some(i_prot.read_i64()?),
                6 => {
                    let list_ident = i_prot.read_list_begin()?;
                    for _ in 0..list_ident.size {
                        annotations.push(Annotation::read_from_in_protocol(i_prot)?);
                    }
                    i_prot.read_list_end()?;
                }
                8 => {
                    let list_ident = i_prot.read_list_begin()?;
                    for _ in 0..list_ident.size {
                        binary_annotations.push(BinaryAnnotation::read_from_in_protocol(i_prot)?);
                    }
                    i_prot.read_list_end()?;
                }
                9 => debug = i_prot.read_bool()?,
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(Span {
            trace_id,
            name,
            id,
            parent_id,
            annotations,
            binary_annotations,
            debug,
        })
    }
}

/// Render a batch of spans as the collector's expected framing: a thrift
/// binary list header followed by one struct per span.
pub fn serialize(spans: &[Span]) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    {
        let mut o_prot = TBinaryOutputProtocol::new(&mut buffer, true);
        o_prot.write_list_begin(&TListIdentifier::new(TType::Struct, spans.len() as i32))?;
        for span in spans {
            span.write_to_out_protocol(&mut o_prot)?;
        }
        o_prot.write_list_end()?;
    }
    Ok(buffer)
}

/// Decode the framing produced by [`serialize`]; `deserialize(serialize(x))`
/// returns `x` for any well-formed batch.
pub fn deserialize(bytes: &[u8]) -> Result<Vec<Span>, Error> {
    let mut i_prot = TBinaryInputProtocol::new(bytes, true);
    let list_ident = i_prot.read_list_begin()?;
    if list_ident.element_type != TType::Struct {
        return Err(Error::MalformedPayload(format!(
            "expected a list of span structs, got {:?}",
            list_ident.element_type
        )));
    }
    let mut spans = Vec::with_capacity(list_ident.size.max(0) as usize);
    for _ in 0..list_ident.size {
        spans.push(Span::read_from_in_protocol(&mut i_prot)?);
    }
    i_prot.read_list_end()?;
    Ok(spans)
}
