/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * CISCO-MEMORY-POOL-MIB ciscoMemoryPoolEntry, enterprises.cisco(9).
 * ciscoMgmt(9).ciscoMemoryPoolMIB(48); row 2 is the I/O pool.  Values are
 * in bytes.
 */
pub const MEMORY_POOL: &[u32] = &[1, 3, 6, 1, 4, 1, 9, 9, 48];
pub const MEMORY_POOL_USED: &[u32] =
    &[1, 3, 6, 1, 4, 1, 9, 9, 48, 1, 1, 1, 5, 2];
pub const MEMORY_POOL_FREE: &[u32] =
    &[1, 3, 6, 1, 4, 1, 9, 9, 48, 1, 1, 1, 6, 2];

/**
 * OLD-CISCO-CHASSIS-MIB processorRam, bytes.
 */
pub const PROCESSOR_RAM: &[u32] = &[1, 3, 6, 1, 4, 1, 9, 3, 6, 6, 0];
pub const CHASSIS: &[u32] = &[1, 3, 6, 1, 4, 1, 9, 3, 6];

/*
 * CISCO-PROCESS-MIB cpmCPUTotalEntry, ciscoMgmt(9).ciscoProcessMIB(109);
 * load averages are in hundredths for the first CPU row.
 */
pub const PROCESS: &[u32] = &[1, 3, 6, 1, 4, 1, 9, 9, 109];
pub const CPM_CPU_TOTAL_5SEC_REV: &[u32] =
    &[1, 3, 6, 1, 4, 1, 9, 9, 109, 1, 1, 1, 1, 6];
pub const CPM_CPU_LOAD_AVG_1MIN: &[u32] =
    &[1, 3, 6, 1, 4, 1, 9, 9, 109, 1, 1, 1, 1, 24, 1];
pub const CPM_CPU_LOAD_AVG_5MIN: &[u32] =
    &[1, 3, 6, 1, 4, 1, 9, 9, 109, 1, 1, 1, 1, 25, 1];
pub const CPM_CPU_LOAD_AVG_15MIN: &[u32] =
    &[1, 3, 6, 1, 4, 1, 9, 9, 109, 1, 1, 1, 1, 26, 1];
