use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use thrift::protocol::{
    field_id, TFieldIdentifier, TInputProtocol, TOutputProtocol, TStructIdentifier, TType,
};
use typed_builder::TypedBuilder;

/// The reporting process's identity, stamped on every annotation it emits.
///
/// Built once at recorder construction and shared for the process lifetime.
#[derive(TypedBuilder, Clone, Debug, PartialEq)]
pub struct Endpoint {
    /// Service name under which spans are grouped.
    #[builder(setter(into))]
    pub service_name: String,
    /// Resolved local address, absent when resolution failed.
    #[builder(default)]
    pub ipv4: Option<Ipv4Addr>,
    /// Port of the reporting service, zero when unknown.
    #[builder(default)]
    pub port: u16,
}

impl Endpoint {
    /// Build the endpoint descriptor from a service name and an optional
    /// explicit address. Without an explicit address the local host address
    /// is resolved best-effort; the reporter must never fail to start
    /// because resolution is unavailable.
    pub(crate) fn new(service_name: String, service_addr: Option<SocketAddr>) -> Self {
        match service_addr {
            Some(SocketAddr::V4(v4)) => Endpoint::builder()
                .service_name(service_name)
                .ipv4(Some(*v4.ip()))
                .port(v4.port())
                .build(),
            // The v1 wire endpoint only carries an ipv4 address; a v6-only
            // host degrades to name and port.
            Some(SocketAddr::V6(v6)) => Endpoint::builder()
                .service_name(service_name)
                .port(v6.port())
                .build(),
            None => Endpoint::builder()
                .service_name(service_name)
                .ipv4(local_ipv4())
                .build(),
        }
    }

    pub(crate) fn write_to_out_protocol(
        &self,
        o_prot: &mut dyn TOutputProtocol,
    ) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("Endpoint"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("ipv4", TType::I32, 1))?;
        o_prot.write_i32(self.ipv4.map(|ip| u32::from(ip) as i32).unwrap_or(0))?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("port", TType::I16, 2))?;
        o_prot.write_i16(self.port as i16)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("service_name", TType::String, 3))?;
        o_prot.write_string(&self.service_name)?;
        o_prot.write_field_end()?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }

    pub(crate) fn read_from_in_protocol(
        i_prot: &mut dyn TInputProtocol,
    ) -> thrift::Result<Endpoint> {
        i_prot.read_struct_begin()?;
        let mut ipv4 = 0i32;
        let mut port = 0i16;
        let mut service_name = String::new();
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => ipv4 = i_prot.read_i32()?,
                2 => port = i_prot.read_i16()?,
                3 => service_name = i_prot.read_string()?,
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(Endpoint {
            service_name,
            ipv4: (ipv4 != 0).then(|| Ipv4Addr::from(ipv4 as u32)),
            port: port as u16,
        })
    }
}

/// Best-effort local address discovery: a connected UDP socket reveals the
/// outbound interface address without sending any packets. Returns `None`
/// on hosts without a route.
fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(("8.8.8.8", 53)).ok()?;
    match socket.local_addr().ok()? {
        SocketAddr::V4(v4) if !v4.ip().is_unspecified() => Some(*v4.ip()),
        _ => None,
    }
}
