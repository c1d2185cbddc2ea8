/*
 * Copyright 2024 Oxide Computer Company
 */

/**
 * HOST-RESOURCES-MIB hrSystem group.
 */
pub const HR_SYSTEM: &[u32] = &[1, 3, 6, 1, 2, 1, 25, 1];

/**
 * hrSystemDate, a DateAndTime.
 */
pub const HR_SYSTEM_DATE: &[u32] = &[1, 3, 6, 1, 2, 1, 25, 1, 2, 0];

/**
 * hrProcessorLoad column; one row per CPU.
 */
pub const HR_PROCESSOR_LOAD: &[u32] = &[1, 3, 6, 1, 2, 1, 25, 3, 3, 1, 2];
