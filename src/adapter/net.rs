//! Ephemeral loopback port allocation

use std::{collections::HashSet, net::IpAddr};

use tracing::{Level, event};

use crate::domain::{address::ServiceAddress, constant::ports, error::DevError};

/// How many times the OS is asked again when it returns a port already issued this run
const MAX_ATTEMPTS: usize = 16;

/// Hands out free TCP ports on one loopback IP.
///
/// Each call binds a temporary socket on port 0, reads the port the OS picked and
/// releases the socket. Ports issued (or reserved) earlier in the run are never
/// handed out twice. A third party grabbing the port between release and reuse is
/// an accepted race.
#[derive(Debug)]
pub struct PortAllocator {
    ip:     IpAddr,
    issued: HashSet<u16>
}

impl PortAllocator {
    pub fn new(ip: IpAddr) -> Self {
        Self { ip, issued: HashSet::new() }
    }

    /// Mark a fixed port as taken so it is never allocated
    pub fn reserve(&mut self, port: u16) {
        self.issued.insert(port);
    }

    /// Obtain a free port that has not been issued before in this run
    pub fn allocate(&mut self) -> Result<u16, DevError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let port = free_port(self.ip)?;
            if self.issued.insert(port) {
                event!(Level::DEBUG, event = ports::PORT_ALLOCATED, port = port);
                return Ok(port);
            }
            event!(Level::DEBUG, event = ports::PORT_COLLISION, port = port, attempt = attempt);
        }

        Err(DevError::PortAllocation(format!("no unused port on {} after {} attempts", self.ip, MAX_ATTEMPTS)))
    }

    pub fn allocate_address(&mut self) -> Result<ServiceAddress, DevError> {
        let port = self.allocate()?;
        ServiceAddress::loopback(self.ip, port)
    }
}

fn free_port(ip: IpAddr) -> Result<u16, DevError> {
    let listener = std::net::TcpListener::bind((ip, 0))
        .map_err(|e| DevError::PortAllocation(format!("failed to bind {}:0: {}", ip, e)))?;
    let address = listener.local_addr().map_err(|e| DevError::PortAllocation(e.to_string()))?;
    Ok(address.port())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_sequential_allocations_are_distinct() {
        let mut allocator = PortAllocator::new(LOCALHOST);
        let ports: Vec<u16> = (0..8).map(|_| allocator.allocate().unwrap()).collect();

        let unique: HashSet<u16> = ports.iter().copied().collect();
        assert_eq!(unique.len(), ports.len());
        assert!(ports.iter().all(|port| *port != 0));
    }

    #[test]
    fn test_allocated_port_is_bindable() {
        let mut allocator = PortAllocator::new(LOCALHOST);
        let address = allocator.allocate_address().unwrap();

        let listener = std::net::TcpListener::bind(address.socket_addr());
        assert!(listener.is_ok());
    }

    #[test]
    fn test_reserved_port_is_never_issued() {
        let mut allocator = PortAllocator::new(LOCALHOST);
        let first = allocator.allocate().unwrap();

        let mut other = PortAllocator::new(LOCALHOST);
        other.reserve(first);
        for _ in 0..8 {
            assert_ne!(other.allocate().unwrap(), first);
        }
    }
}
