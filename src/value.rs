/*
 * Copyright 2024 Oxide Computer Company
 */

use std::net::Ipv4Addr;
use std::ops::Deref;
use std::result::Result as SResult;

use csnmp::ObjectValue;
use serde::de::value::U32Deserializer;
use serde::de::{DeserializeSeed, Error, SeqAccess, Unexpected};
use serde::{forward_to_deserialize_any, Deserializer};

use crate::Oid;

/**
 * One value cell as returned by an agent.
 */
#[derive(Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct Value(pub(crate) ObjectValue);

impl Deref for Value {
    type Target = ObjectValue;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ObjectValue> for Value {
    fn from(v: ObjectValue) -> Self {
        Value(v)
    }
}

impl Value {
    pub fn integer(i: i32) -> Value {
        Value(ObjectValue::Integer(i))
    }

    pub fn string<B: Into<Vec<u8>>>(b: B) -> Value {
        Value(ObjectValue::String(b.into()))
    }

    pub fn counter32(u: u32) -> Value {
        Value(ObjectValue::Counter32(u))
    }

    pub fn unsigned32(u: u32) -> Value {
        Value(ObjectValue::Unsigned32(u))
    }

    pub fn timeticks(u: u32) -> Value {
        Value(ObjectValue::TimeTicks(u))
    }

    pub fn counter64(u: u64) -> Value {
        Value(ObjectValue::Counter64(u))
    }

    pub fn ip_address(ip: Ipv4Addr) -> Value {
        Value(ObjectValue::IpAddress(ip))
    }

    pub fn object_id(oid: Oid) -> Value {
        Value(ObjectValue::ObjectId(*oid))
    }

    pub fn opaque<B: Into<Vec<u8>>>(b: B) -> Value {
        Value(ObjectValue::Opaque(b.into()))
    }

    /**
     * Printable form of the value; octet strings are decoded lossily and
     * trailing NULs (common in vendor MIBs) are dropped.
     */
    pub fn as_text(&self) -> String {
        match &self.0 {
            ObjectValue::String(buf) | ObjectValue::Opaque(buf) => {
                String::from_utf8_lossy(buf).trim_end_matches('\0').to_string()
            }
            ObjectValue::Integer(i) => i.to_string(),
            ObjectValue::ObjectId(oid) => oid.to_string(),
            ObjectValue::IpAddress(ip) => ip.to_string(),
            ObjectValue::Counter32(u)
            | ObjectValue::Unsigned32(u)
            | ObjectValue::TimeTicks(u) => u.to_string(),
            ObjectValue::Counter64(u) => u.to_string(),
        }
    }

    /**
     * Numeric reading of the value.  Some agents report integers as octet
     * strings (UCD-SNMP laLoadInt on old firmware, for one), so decimal text
     * is accepted as well.
     */
    pub fn as_u64(&self) -> Option<u64> {
        match &self.0 {
            ObjectValue::Integer(i) => u64::try_from(*i).ok(),
            ObjectValue::Counter32(u)
            | ObjectValue::Unsigned32(u)
            | ObjectValue::TimeTicks(u) => Some((*u).into()),
            ObjectValue::Counter64(u) => Some(*u),
            ObjectValue::String(_) => self.as_text().trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match &self.0 {
            ObjectValue::Integer(i) => Some((*i).into()),
            ObjectValue::String(_) => self.as_text().trim().parse().ok(),
            _ => self.as_u64().map(|u| u as f64),
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.0 {
            ObjectValue::String(buf) | ObjectValue::Opaque(buf) => Some(buf),
            _ => None,
        }
    }

    pub fn as_ipv4(&self) -> Option<Ipv4Addr> {
        match &self.0 {
            ObjectValue::IpAddress(ip) => Some(*ip),
            ObjectValue::String(buf) if buf.len() == 4 => {
                Some(Ipv4Addr::new(buf[0], buf[1], buf[2], buf[3]))
            }
            _ => None,
        }
    }
}

impl<'de> serde::de::IntoDeserializer<'de> for &'de Value {
    type Deserializer = ValueDeserializer<'de>;

    fn into_deserializer(self) -> Self::Deserializer {
        ValueDeserializer(&self.0)
    }
}

/**
 * Lets table rows be deserialised straight into typed structs (and
 * serde_repr enums) by column name.
 */
#[repr(transparent)]
pub struct ValueDeserializer<'a>(&'a ObjectValue);

impl<'de> Deserializer<'de> for ValueDeserializer<'de> {
    type Error = serde::de::value::Error;

    fn deserialize_any<V>(self, v: V) -> SResult<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        match self.0 {
            ObjectValue::Integer(i) => v.visit_i64((*i).into()),
            ObjectValue::String(buf) => match std::str::from_utf8(buf) {
                Ok(s) => v.visit_borrowed_str(s),
                Err(_) => v.visit_borrowed_bytes(buf),
            },
            ObjectValue::ObjectId(oid) => {
                v.visit_seq(OidSeqAccess { oid: oid.as_slice(), pos: 0 })
            }
            ObjectValue::Counter32(u)
            | ObjectValue::Unsigned32(u)
            | ObjectValue::TimeTicks(u) => v.visit_u64((*u).into()),
            ObjectValue::Counter64(u) => v.visit_u64(*u),
            /*
             * Render addresses as text so that Ipv4Addr fields parse them:
             */
            ObjectValue::IpAddress(ip) => v.visit_string(ip.to_string()),
            ObjectValue::Opaque(buf) => v.visit_borrowed_bytes(buf),
        }
    }

    fn deserialize_bytes<V>(self, v: V) -> SResult<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        match self.0 {
            ObjectValue::String(buf) | ObjectValue::Opaque(buf) => {
                v.visit_borrowed_bytes(buf)
            }
            ObjectValue::IpAddress(ip) => v.visit_bytes(&ip.octets()),
            _ => Err(serde::de::value::Error::invalid_value(
                Unexpected::Other("other SNMP value"),
                &"an opaque or a string",
            )),
        }
    }

    fn deserialize_byte_buf<V>(self, v: V) -> SResult<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_bytes(v)
    }

    fn deserialize_option<V>(self, v: V) -> SResult<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        v.visit_some(self)
    }

    fn deserialize_bool<V>(self, v: V) -> SResult<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        /*
         * SNMP TruthValue: true(1), false(2).
         */
        match self.0 {
            ObjectValue::Integer(1) => v.visit_bool(true),
            ObjectValue::Integer(2) => v.visit_bool(false),
            ObjectValue::Integer(i) => Err(Error::invalid_value(
                Unexpected::Signed((*i).into()),
                &"a TruthValue",
            )),
            _ => Err(Error::invalid_type(
                Unexpected::Other("other SNMP value"),
                &"a TruthValue",
            )),
        }
    }

    forward_to_deserialize_any! {
        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        unit unit_struct newtype_struct seq tuple tuple_struct map struct
        enum identifier ignored_any
    }
}

struct OidSeqAccess<'a> {
    oid: &'a [u32],
    pos: usize,
}

impl<'de, 'a> SeqAccess<'de> for OidSeqAccess<'a> {
    type Error = serde::de::value::Error;

    fn next_element_seed<T>(
        &mut self,
        seed: T,
    ) -> SResult<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        if self.pos >= self.oid.len() {
            Ok(None)
        } else {
            let v = self.oid[self.pos];
            self.pos += 1;
            seed.deserialize(U32Deserializer::new(v)).map(Some)
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            ObjectValue::Integer(i) => format_args!("{}", i).fmt(f),
            ObjectValue::String(vu) => {
                format_args!("{:?}", String::from_utf8_lossy(vu)).fmt(f)
            }
            ObjectValue::ObjectId(oid) => format_args!("<oid:{oid}>").fmt(f),
            ObjectValue::IpAddress(ip) => format_args!("{}", ip).fmt(f),
            ObjectValue::Counter32(u) => format_args!("{}c", u).fmt(f),
            ObjectValue::Unsigned32(u) => format_args!("{}", u).fmt(f),
            ObjectValue::TimeTicks(u) => format_args!("{}t", u).fmt(f),
            ObjectValue::Opaque(buf) => format_args!("{:?}", buf).fmt(f),
            ObjectValue::Counter64(u) => format_args!("{}C", u).fmt(f),
        }
    }
}
