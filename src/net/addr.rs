//! 主机地址分配
//!
//! MAC / IP 都是主机编号的纯函数：MAC 为 48 位整数的冒号十六进制形式，
//! IP 从 `10.0.0.0` 起按编号递增。

use std::fmt;
use std::net::Ipv4Addr;

use super::id::HostId;

/// IP 基址 `10.0.0.0/8`
const IP_BASE: u32 = 0x0a00_0000;

/// `10.0.0.0/8` 内可编址的主机数上限（不含网络地址本身）
pub const MAX_HOSTS: usize = (1 << 24) - 1;

/// 48 位 MAC 地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddr(u64);

impl MacAddr {
    pub fn from_u64(raw: u64) -> Self {
        Self(raw & 0xffff_ffff_ffff)
    }

    pub fn octets(self) -> [u8; 6] {
        let b = self.0.to_be_bytes();
        [b[2], b[3], b[4], b[5], b[6], b[7]]
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.octets();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

/// 主机编号对应的 MAC 地址
pub fn mac(host: HostId) -> MacAddr {
    MacAddr::from_u64(host.0 as u64)
}

/// 主机编号对应的 IP 地址；编号需不超过 [`MAX_HOSTS`]
pub fn ip(host: HostId) -> Ipv4Addr {
    Ipv4Addr::from(IP_BASE.wrapping_add(host.0 as u32))
}
