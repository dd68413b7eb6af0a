//! Loopback service addresses

use std::{
    fmt::{self, Display},
    net::{IpAddr, SocketAddr}
};

use serde::{Serialize, Serializer};

use crate::domain::error::DevError;

/// Host and port of a locally running service.
///
/// Addresses are immutable once assigned and always point at a loopback interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceAddress {
    ip:   IpAddr,
    port: u16
}

impl ServiceAddress {
    /// Build an address, rejecting anything that is not loopback
    pub fn loopback(ip: IpAddr, port: u16) -> Result<Self, DevError> {
        if !ip.is_loopback() {
            return Err(DevError::Configuration(format!("{} is not a loopback address", ip)));
        }
        Ok(Self { ip, port })
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// Browser origin for this address, e.g. `http://127.0.0.1:5400`
    pub fn http_origin(&self) -> String {
        format!("http://{}", self)
    }
}

impl Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

impl Serialize for ServiceAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn test_rejects_non_loopback() {
        let result = ServiceAddress::loopback(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 80);
        assert!(matches!(result, Err(DevError::Configuration(_))));
    }

    #[test]
    fn test_origin_and_display() {
        let address = ServiceAddress::loopback(IpAddr::V4(Ipv4Addr::LOCALHOST), 5400).unwrap();
        assert_eq!(address.to_string(), "127.0.0.1:5400");
        assert_eq!(address.http_origin(), "http://127.0.0.1:5400");
    }
}
