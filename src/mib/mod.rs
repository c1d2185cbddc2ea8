/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * Numeric OIDs for the MIB objects the vendor profiles read.  Columns of
 * conceptual tables are given without an index; the engine appends one.
 */

pub mod cisco;
pub mod host_resources;
pub mod ieee802dot11;
pub mod mib_2;
pub mod ucd;

/**
 * The path to the root is via: iso(1) org(3) dod(6) internet(1) mgmt(2)
 * mib-2(1).
 */
pub const MIB_2: &[u32] = &[1, 3, 6, 1, 2, 1];

/**
 * internet(1).private(4).enterprises(1)
 */
pub const ENTERPRISES: &[u32] = &[1, 3, 6, 1, 4, 1];
