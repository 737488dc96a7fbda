use crate::net::{Host, HostId, MacAddr, ip, mac};
use std::collections::HashSet;
use std::net::Ipv4Addr;

#[test]
fn mac_is_colon_hex_of_the_host_index() {
    assert_eq!(mac(HostId(1)).to_string(), "00:00:00:00:00:01");
    assert_eq!(mac(HostId(16)).to_string(), "00:00:00:00:00:10");
    assert_eq!(mac(HostId(300)).to_string(), "00:00:00:00:01:2c");
    assert_eq!(MacAddr::from_u64(0x0102_0304_0506).octets(), [1, 2, 3, 4, 5, 6]);
}

#[test]
fn ip_counts_up_from_ten_slash_eight() {
    assert_eq!(ip(HostId(1)), Ipv4Addr::new(10, 0, 0, 1));
    assert_eq!(ip(HostId(255)), Ipv4Addr::new(10, 0, 0, 255));
    assert_eq!(ip(HostId(256)), Ipv4Addr::new(10, 0, 1, 0));
    assert_eq!(ip(HostId(70_000)), Ipv4Addr::new(10, 1, 17, 112));
}

#[test]
fn addresses_are_injective() {
    let hosts: Vec<Host> = (1..=5000).map(|i| Host::new(HostId(i))).collect();
    let macs: HashSet<_> = hosts.iter().map(|h| h.mac).collect();
    let ips: HashSet<_> = hosts.iter().map(|h| h.ip).collect();
    assert_eq!(macs.len(), hosts.len());
    assert_eq!(ips.len(), hosts.len());
}
