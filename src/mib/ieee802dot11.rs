/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * IEEE802dot11-MIB, iso(1).member-body(2).us(840).ieee802dot11(10036).
 * Every table is indexed by the ifIndex of the radio.
 */
pub const IEEE802DOT11: &[u32] = &[1, 2, 840, 10036];

/**
 * dot11smt.dot11StationConfigTable.dot11StationConfigEntry.dot11StationID
 */
pub const DOT11_STATION_ID: &[u32] = &[1, 2, 840, 10036, 1, 1, 1, 1];

/**
 * dot11smt.dot11StationConfigTable.dot11StationConfigEntry.dot11DesiredSSID
 */
pub const DOT11_DESIRED_SSID: &[u32] = &[1, 2, 840, 10036, 1, 1, 1, 9];

/**
 * dot11phy.dot11PhyOperationTable... dot11manufacturerProductName
 */
pub const DOT11_PRODUCT_NAME: &[u32] = &[1, 2, 840, 10036, 3, 1, 2, 1, 3];

/**
 * dot11manufacturerProductVersion
 */
pub const DOT11_PRODUCT_VERSION: &[u32] = &[1, 2, 840, 10036, 3, 1, 2, 1, 4];
