/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * UCD-SNMP-MIB memory group, enterprises.ucdavis(2021).memory(4).  All
 * sizes are in kB.
 */
pub const MEMORY: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4];
pub const MEM_TOTAL_SWAP: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4, 3, 0];
pub const MEM_AVAIL_SWAP: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4, 4, 0];
pub const MEM_TOTAL_REAL: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4, 5, 0];
pub const MEM_AVAIL_REAL: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4, 6, 0];
pub const MEM_SHARED: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4, 13, 0];
pub const MEM_BUFFER: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4, 14, 0];
pub const MEM_CACHED: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4, 15, 0];

/*
 * laTable(10).laEntry(1).laLoad(3), rows 1, 2 and 3 for the 1, 5 and 15
 * minute averages as decimal text.
 */
pub const LA_TABLE: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 10];
pub const LA_LOAD_1: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 10, 1, 3, 1];
pub const LA_LOAD_5: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 10, 1, 3, 2];
pub const LA_LOAD_15: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 10, 1, 3, 3];
