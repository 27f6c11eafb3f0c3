//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;
use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::packet::consts::*;

// Semantic type of an attribute value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum AttrType {
    String,
    Octets,
    Ipv4Addr,
    Ipv6Addr,
    Ipv4Prefix,
    Ipv6Prefix,
    ComboIpAddr,
    ComboIpPrefix,
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Date,
    TimeDelta,
    Ethernet,
    Ifid,
    Size,
    Abinary,
    Tlv,
    Struct,
    Vsa,
    Vendor,
    Extended,
}

// Attribute flags.
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct AttrFlags: u8 {
        // A grouping tag octet may precede the value (RFC 2868).
        const HAS_TAG = 0x01;
        // Values split across consecutive attributes (RFC 2869).
        const CONCAT = 0x02;
        // Long-extended format with a flag octet (RFC 6929).
        const EXTRA = 0x04;
        // Fabricated placeholder for an attribute absent from the
        // dictionary.
        const UNKNOWN = 0x08;
    }
}

// Obfuscation scheme applied to the value on the wire.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum Encrypt {
    #[default]
    None,
    UserPassword,
    TunnelPassword,
    AscendSecret,
}

// Attribute descriptor.
//
// Descriptors form a tree rooted at the dictionary root: vendors hang
// off Vendor-Specific, TLV children off their container, and so on.
// Fabricated "unknown" descriptors live outside the dictionary maps
// (key 0) and are kept alive by the pairs referencing them.
#[derive(Debug)]
pub struct DictAttr {
    pub number: u32,
    pub name: String,
    pub attr_type: AttrType,
    pub flags: AttrFlags,
    pub encrypt: Encrypt,
    // Nonzero pins the plaintext width of an obfuscated value
    // (MS-CHAP-MPPE-Keys).
    pub fixed_len: u8,
    // PEN of the enclosing vendor, or 0 outside any vendor space.
    pub vendor: u32,
    parent: Option<Arc<DictAttr>>,
    key: u32,
}

// Vendor record: the sub-attribute header schema used inside the
// vendor's Vendor-Specific space.
#[derive(Clone, Debug)]
pub struct DictVendor {
    pub pen: u32,
    pub name: String,
    pub type_width: usize,
    pub length_width: usize,
    // Values may continue across multiple Vendor-Specific attributes
    // (WiMAX).
    pub continuation: bool,
}

// Attribute dictionary.
#[derive(Debug)]
pub struct Dict {
    root: Arc<DictAttr>,
    attrs: HashMap<(u32, u32), Arc<DictAttr>>,
    // Type variants of combo attributes, keyed by the combo's key.
    variants: HashMap<(u32, AttrType), Arc<DictAttr>>,
    vendors: HashMap<u32, DictVendor>,
    next_key: u32,
}

// ===== impl AttrType =====

impl AttrType {
    // Minimum and maximum value sizes on the wire, consulted after tag
    // stripping and obfuscation unwrapping.
    pub(crate) const fn wire_sizes(&self) -> (usize, usize) {
        match self {
            AttrType::String | AttrType::Octets => (0, usize::MAX),
            AttrType::Ipv4Addr => (4, 4),
            AttrType::Ipv6Addr => (16, 16),
            AttrType::Ipv4Prefix => (2, 6),
            AttrType::Ipv6Prefix => (2, 18),
            AttrType::ComboIpAddr => (4, 16),
            AttrType::ComboIpPrefix => (6, 18),
            AttrType::Bool => (1, 1),
            AttrType::Uint8 | AttrType::Int8 => (1, 1),
            AttrType::Uint16 | AttrType::Int16 => (2, 2),
            AttrType::Uint32 | AttrType::Int32 => (4, 4),
            AttrType::Uint64 | AttrType::Int64 => (8, 8),
            AttrType::Float32 => (4, 4),
            AttrType::Float64 => (8, 8),
            AttrType::Date => (4, 4),
            AttrType::TimeDelta => (4, 4),
            AttrType::Ethernet => (6, 6),
            AttrType::Ifid => (8, 8),
            AttrType::Size => (2, 8),
            AttrType::Abinary => (32, usize::MAX),
            AttrType::Tlv => (2, usize::MAX),
            AttrType::Struct => (1, usize::MAX),
            AttrType::Vsa => (4, usize::MAX),
            AttrType::Vendor => (0, 0),
            AttrType::Extended => (2, usize::MAX),
        }
    }
}

// ===== impl DictAttr =====

impl DictAttr {
    pub fn parent(&self) -> Option<&Arc<DictAttr>> {
        self.parent.as_ref()
    }

    pub fn is_unknown(&self) -> bool {
        self.flags.contains(AttrFlags::UNKNOWN)
    }

    // Fabricates a descriptor for an attribute absent from the
    // dictionary. When `parent` is a Vendor-Specific container and a
    // PEN is given, an unknown vendor node is fabricated in between,
    // preserving the full lineage for later re-encoding.
    pub fn unknown_from_fields(
        parent: &Arc<DictAttr>,
        vendor: u32,
        number: u32,
    ) -> Arc<DictAttr> {
        let parent = if parent.attr_type == AttrType::Vsa && vendor != 0 {
            DictAttr::unknown_vendor_from_num(parent, vendor)
        } else {
            parent.clone()
        };

        let vendor = if vendor != 0 { vendor } else { parent.vendor };
        Arc::new(DictAttr {
            number,
            name: unknown_name(&parent, number),
            attr_type: AttrType::Octets,
            flags: AttrFlags::UNKNOWN,
            encrypt: Encrypt::None,
            fixed_len: 0,
            vendor,
            parent: Some(parent),
            key: 0,
        })
    }

    // Fabricates a vendor node for an unregistered PEN.
    pub fn unknown_vendor_from_num(
        parent: &Arc<DictAttr>,
        pen: u32,
    ) -> Arc<DictAttr> {
        Arc::new(DictAttr {
            number: pen,
            name: format!("Vendor-{pen}"),
            attr_type: AttrType::Vendor,
            flags: AttrFlags::UNKNOWN,
            encrypt: Encrypt::None,
            fixed_len: 0,
            vendor: pen,
            parent: Some(parent.clone()),
            key: 0,
        })
    }

    // Rewrites a descriptor as unknown octets, keeping its number and
    // lineage. Used when the value cannot be parsed as declared.
    pub(crate) fn to_raw(da: &Arc<DictAttr>) -> Arc<DictAttr> {
        Arc::new(DictAttr {
            number: da.number,
            name: match da.parent() {
                Some(parent) => unknown_name(parent, da.number),
                None => format!("Attr-{}", da.number),
            },
            attr_type: AttrType::Octets,
            flags: AttrFlags::UNKNOWN,
            encrypt: Encrypt::None,
            fixed_len: 0,
            vendor: da.vendor,
            parent: da.parent.clone(),
            key: 0,
        })
    }
}

// Builds the dotted name of a fabricated attribute, e.g. "Attr-26.9.1".
fn unknown_name(parent: &DictAttr, number: u32) -> String {
    let mut nums = vec![number];
    let mut cur = parent;
    while let Some(up) = cur.parent() {
        nums.push(cur.number);
        cur = up.as_ref();
    }
    nums.reverse();
    let path = nums
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".");
    format!("Attr-{path}")
}

// ===== impl Dict =====

impl Dict {
    // Creates an empty dictionary holding only the root container.
    pub fn new() -> Dict {
        let root = Arc::new(DictAttr {
            number: 0,
            name: "radius".to_owned(),
            attr_type: AttrType::Tlv,
            flags: AttrFlags::empty(),
            encrypt: Encrypt::None,
            fixed_len: 0,
            vendor: 0,
            parent: None,
            key: 1,
        });
        Dict {
            root,
            attrs: HashMap::new(),
            variants: HashMap::new(),
            vendors: HashMap::new(),
            next_key: 2,
        }
    }

    pub fn root(&self) -> &Arc<DictAttr> {
        &self.root
    }

    // Registers an attribute under `parent`.
    pub fn attr_register(
        &mut self,
        parent: &Arc<DictAttr>,
        number: u32,
        name: &str,
        attr_type: AttrType,
    ) -> Arc<DictAttr> {
        self.attr_register_full(
            parent,
            number,
            name,
            attr_type,
            AttrFlags::empty(),
            Encrypt::None,
            0,
        )
    }

    // Registers an attribute with explicit flags, obfuscation scheme
    // and pinned plaintext width.
    pub fn attr_register_full(
        &mut self,
        parent: &Arc<DictAttr>,
        number: u32,
        name: &str,
        attr_type: AttrType,
        flags: AttrFlags,
        encrypt: Encrypt,
        fixed_len: u8,
    ) -> Arc<DictAttr> {
        let key = self.next_key;
        self.next_key += 1;

        let vendor = if parent.attr_type == AttrType::Vendor {
            parent.number
        } else {
            parent.vendor
        };
        let da = Arc::new(DictAttr {
            number,
            name: name.to_owned(),
            attr_type,
            flags,
            encrypt,
            fixed_len,
            vendor,
            parent: Some(parent.clone()),
            key,
        });
        self.attrs.insert((parent.key, number), da.clone());

        // Combo attributes resolve to a concrete variant once the
        // value length is known; register both variants up front.
        match attr_type {
            AttrType::ComboIpAddr => {
                self.variant_register(&da, AttrType::Ipv4Addr);
                self.variant_register(&da, AttrType::Ipv6Addr);
            }
            AttrType::ComboIpPrefix => {
                self.variant_register(&da, AttrType::Ipv4Prefix);
                self.variant_register(&da, AttrType::Ipv6Prefix);
            }
            _ => (),
        }

        da
    }

    fn variant_register(&mut self, combo: &Arc<DictAttr>, attr_type: AttrType) {
        let variant = Arc::new(DictAttr {
            number: combo.number,
            name: combo.name.clone(),
            attr_type,
            flags: combo.flags,
            encrypt: combo.encrypt,
            fixed_len: combo.fixed_len,
            vendor: combo.vendor,
            parent: combo.parent.clone(),
            key: 0,
        });
        self.variants.insert((combo.key, attr_type), variant);
    }

    // Registers a vendor: both the vendor node under `parent` (which
    // should be a Vendor-Specific container) and the schema record.
    pub fn vendor_register(
        &mut self,
        parent: &Arc<DictAttr>,
        pen: u32,
        name: &str,
        type_width: usize,
        length_width: usize,
        continuation: bool,
    ) -> Arc<DictAttr> {
        let key = self.next_key;
        self.next_key += 1;

        let da = Arc::new(DictAttr {
            number: pen,
            name: name.to_owned(),
            attr_type: AttrType::Vendor,
            flags: AttrFlags::empty(),
            encrypt: Encrypt::None,
            fixed_len: 0,
            vendor: pen,
            parent: Some(parent.clone()),
            key,
        });
        self.attrs.insert((parent.key, pen), da.clone());
        self.vendors.insert(
            pen,
            DictVendor {
                pen,
                name: name.to_owned(),
                type_width,
                length_width,
                continuation,
            },
        );

        da
    }

    // Looks up a child attribute by number. Fabricated descriptors
    // have no children.
    pub fn child_by_num(
        &self,
        parent: &DictAttr,
        number: u32,
    ) -> Option<Arc<DictAttr>> {
        if parent.key == 0 {
            return None;
        }
        self.attrs.get(&(parent.key, number)).cloned()
    }

    // Looks up the concrete variant of a combo attribute.
    pub fn child_by_type(
        &self,
        parent: &DictAttr,
        attr_type: AttrType,
    ) -> Option<Arc<DictAttr>> {
        self.variants.get(&(parent.key, attr_type)).cloned()
    }

    pub fn vendor_by_num(&self, pen: u32) -> Option<&DictVendor> {
        self.vendors.get(&pen)
    }

    // Builds a dictionary preloaded with the standard attributes.
    pub fn base() -> Dict {
        let mut dict = Dict::new();
        let root = dict.root().clone();

        use AttrType::*;
        dict.attr_register(&root, 1, "User-Name", String);
        dict.attr_register_full(
            &root,
            2,
            "User-Password",
            String,
            AttrFlags::empty(),
            Encrypt::UserPassword,
            0,
        );
        dict.attr_register(&root, 3, "CHAP-Password", Octets);
        dict.attr_register(&root, 4, "NAS-IP-Address", Ipv4Addr);
        dict.attr_register(&root, 5, "NAS-Port", Uint32);
        dict.attr_register(&root, 6, "Service-Type", Uint32);
        dict.attr_register(&root, 8, "Framed-IP-Address", Ipv4Addr);
        let vsa = dict.attr_register(&root, 26, "Vendor-Specific", Vsa);
        dict.attr_register(&root, 27, "Session-Timeout", Uint32);
        dict.attr_register(&root, 32, "NAS-Identifier", String);
        dict.attr_register(&root, 44, "Acct-Session-Id", String);
        dict.attr_register(&root, 55, "Event-Timestamp", Date);
        dict.attr_register_full(
            &root,
            64,
            "Tunnel-Type",
            Uint32,
            AttrFlags::HAS_TAG,
            Encrypt::None,
            0,
        );
        dict.attr_register_full(
            &root,
            65,
            "Tunnel-Medium-Type",
            Uint32,
            AttrFlags::HAS_TAG,
            Encrypt::None,
            0,
        );
        dict.attr_register_full(
            &root,
            66,
            "Tunnel-Client-Endpoint",
            String,
            AttrFlags::HAS_TAG,
            Encrypt::None,
            0,
        );
        dict.attr_register_full(
            &root,
            69,
            "Tunnel-Password",
            String,
            AttrFlags::HAS_TAG,
            Encrypt::TunnelPassword,
            0,
        );
        dict.attr_register_full(
            &root,
            79,
            "EAP-Message",
            Octets,
            AttrFlags::CONCAT,
            Encrypt::None,
            0,
        );
        dict.attr_register(&root, 80, "Message-Authenticator", Octets);
        dict.attr_register(&root, 89, "Chargeable-User-Identity", Octets);
        dict.attr_register(&root, 95, "NAS-IPv6-Address", Ipv6Addr);
        dict.attr_register(&root, 97, "Framed-IPv6-Prefix", Ipv6Prefix);
        dict.attr_register(&root, 168, "Framed-IPv6-Address", Ipv6Addr);

        // RFC 6929 extended spaces. 241-244 use the short form,
        // 245-246 carry the extra flag octet. Each space nests an
        // Extended-Vendor-Specific container at number 26.
        for (number, name, extra) in [
            (241, "Extended-Attribute-1", false),
            (242, "Extended-Attribute-2", false),
            (243, "Extended-Attribute-3", false),
            (244, "Extended-Attribute-4", false),
            (245, "Extended-Attribute-5", true),
            (246, "Extended-Attribute-6", true),
        ] {
            let flags = if extra {
                AttrFlags::EXTRA
            } else {
                AttrFlags::empty()
            };
            let ext = dict.attr_register_full(
                &root,
                number,
                name,
                Extended,
                flags,
                Encrypt::None,
                0,
            );
            dict.attr_register(
                &ext,
                EXT_VENDOR_SPECIFIC,
                &format!("Extended-Vendor-Specific-{}", number - 240),
                Vsa,
            );
            if number == 241 {
                dict.attr_register(&ext, 1, "Frag-Status", Uint32);
            }
            if number == 245 {
                dict.attr_register(&ext, 1, "SAML-Assertion", String);
            }
        }

        // Vendors with well-known schemas.
        let cisco =
            dict.vendor_register(&vsa, VENDORPEC_CISCO, "Cisco", 1, 1, false);
        dict.attr_register(&cisco, 1, "Cisco-AVPair", String);

        let microsoft = dict.vendor_register(
            &vsa,
            VENDORPEC_MICROSOFT,
            "Microsoft",
            1,
            1,
            false,
        );
        dict.attr_register_full(
            &microsoft,
            12,
            "MS-CHAP-MPPE-Keys",
            Octets,
            AttrFlags::empty(),
            Encrypt::UserPassword,
            24,
        );

        let ascend =
            dict.vendor_register(&vsa, VENDORPEC_ASCEND, "Ascend", 1, 1, false);
        dict.attr_register_full(
            &ascend,
            214,
            "Ascend-Send-Secret",
            String,
            AttrFlags::empty(),
            Encrypt::AscendSecret,
            0,
        );
        dict.attr_register_full(
            &ascend,
            215,
            "Ascend-Receive-Secret",
            String,
            AttrFlags::empty(),
            Encrypt::AscendSecret,
            0,
        );
        dict.attr_register(&ascend, 242, "Ascend-Data-Filter", Abinary);

        let usr = dict.vendor_register(&vsa, VENDORPEC_USR, "USR", 4, 0, false);
        dict.attr_register(&usr, 0x0066, "USR-Last-Number-Dialed-Out", String);

        let lucent =
            dict.vendor_register(&vsa, VENDORPEC_LUCENT, "Lucent", 2, 1, false);
        dict.attr_register(&lucent, 2, "Lucent-Max-Shared-Users", Uint32);

        let starent = dict.vendor_register(
            &vsa,
            VENDORPEC_STARENT,
            "Starent",
            2,
            2,
            false,
        );
        dict.attr_register(&starent, 1, "SN-VPN-Name", String);

        let wimax =
            dict.vendor_register(&vsa, VENDORPEC_WIMAX, "WiMAX", 1, 1, true);
        let capability =
            dict.attr_register(&wimax, 1, "WiMAX-Capability", Tlv);
        dict.attr_register(&capability, 1, "WiMAX-Release", String);
        dict.attr_register(
            &capability,
            2,
            "WiMAX-Accounting-Capabilities",
            Uint8,
        );
        dict.attr_register(
            &capability,
            3,
            "WiMAX-Hotlining-Capabilities",
            Uint8,
        );
        dict.attr_register(&wimax, 5, "WiMAX-AAA-Session-Id", Octets);

        dict
    }
}

impl Default for Dict {
    fn default() -> Dict {
        Dict::new()
    }
}
