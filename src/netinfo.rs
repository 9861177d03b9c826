use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Best-effort discovery of the device's LAN IPv4 address.
///
/// Opens a UDP socket toward a public address so the OS picks the outbound
/// interface (the Wi-Fi adapter on a device that is only on Wi-Fi) and
/// reveals its address. Nothing is actually sent. Returns `None` when the
/// device has no usable interface; callers treat that as "running but
/// address unknown", never as a failure.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_never_reports_loopback() {
        // machines without a network are allowed to report None
        if let Some(ip) = local_ipv4() {
            assert!(!ip.is_loopback());
            assert!(!ip.is_unspecified());
        }
    }
}
