/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * system(1)
 */
pub const SYSTEM: &[u32] = &[1, 3, 6, 1, 2, 1, 1];
pub const SYS_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 1, 0];
pub const SYS_UPTIME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 3, 0];
pub const SYS_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 5, 0];

/*
 * interfaces(2).ifTable(2).ifEntry(1)
 */
pub const INTERFACES: &[u32] = &[1, 3, 6, 1, 2, 1, 2];
pub const IF_ENTRY: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1];
pub const IF_INDEX: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 1];
pub const IF_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2];
pub const IF_TYPE: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 3];
pub const IF_MTU: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 4];
pub const IF_SPEED: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 5];
pub const IF_PHYS_ADDRESS: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 6];
pub const IF_OPER_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 8];
pub const IF_IN_OCTETS: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 10];
pub const IF_OUT_OCTETS: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 16];

/*
 * ip(4).ipAddrTable(20).ipAddrEntry(1): ipAdEntAddr(1), ipAdEntIfIndex(2),
 * ipAdEntNetMask(3); indexed by the address itself.
 */
pub const IP_ADDR_ENTRY: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 20, 1];
pub const IP_AD_ENT_ADDR: u32 = 1;
pub const IP_AD_ENT_IF_INDEX: u32 = 2;
pub const IP_AD_ENT_NET_MASK: u32 = 3;

/*
 * ip(4).ipNetToPhysicalTable(35).ipNetToPhysicalEntry(1); indexed by
 * ifIndex, address type, address length and the address octets.
 */
pub const IP_NET_TO_PHYSICAL_ENTRY: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 35, 1];
pub const IP_NET_TO_PHYSICAL_PHYS_ADDRESS: u32 = 4;
pub const IP_NET_TO_PHYSICAL_STATE: u32 = 7;

/*
 * IANAifType values the vendor profiles classify.
 */
pub const IANA_ETHERNET_CSMACD: i64 = 6;
pub const IANA_SOFTWARE_LOOPBACK: i64 = 24;
pub const IANA_FAST_ETHER: i64 = 62;
pub const IANA_IEEE80211: i64 = 71;
pub const IANA_GIGABIT_ETHERNET: i64 = 117;
pub const IANA_TUNNEL: i64 = 131;
pub const IANA_BRIDGE: i64 = 209;
