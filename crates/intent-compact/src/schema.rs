//! Intent schemas and their pinned typehashes.
//!
//! The settlement protocol went through three encodings of the same nested
//! struct. Each is pinned here as data: its type strings and the typehash the
//! contracts were deployed with. [`IntentSchema::verify`] re-derives every
//! pinned hash from its type string and checks that the strings themselves
//! are well formed, so a typo in either breaks startup instead of producing
//! signatures the contract rejects.

use crate::CompactError;
use alloy::primitives::{b256, keccak256, B256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

macro_rules! compact_type {
	() => {
		"MultichainCompact(address sponsor,uint256 nonce,uint256 expires,Element[] elements)"
	};
}
macro_rules! element_type {
	() => {
		"Element(address arbiter,uint256 chainId,Lock[] commitments,Mandate mandate)"
	};
}
macro_rules! lock_type {
	() => {
		"Lock(bytes12 lockTag,address token,uint256 amount)"
	};
}
macro_rules! op_type {
	() => {
		"Op(address to,uint256 value,bytes data)"
	};
}
macro_rules! token_type {
	() => {
		"Token(address token,uint256 amount)"
	};
}
macro_rules! target_mandate_type {
	() => {
		"Mandate(Target target,Op[] originOps,Op[] destOps,bytes32 q)"
	};
}
macro_rules! target_type {
	() => {
		"Target(address recipient,Token[] tokenOut,uint256 targetChain,uint256 fillExpiry,address claimProofer)"
	};
}
macro_rules! dest_mandate_type {
	() => {
		"Mandate(Dest dest,Op[] originOps,Op[] destOps,bytes32 q)"
	};
}
macro_rules! dest_type {
	() => {
		"Dest(address recipient,Token[] tokenOut,uint256 destChain,uint256 fillExpiry,address claimProofer)"
	};
}

/// A struct type as the contract declares it.
#[derive(Debug, Clone, Copy)]
pub struct TypeDecl {
	pub name: &'static str,
	pub type_string: &'static str,
	pub typehash: B256,
}

/// How referenced types follow the primary type in a type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOrdering {
	/// EIP-712: referenced types sorted by name.
	Sorted,
	/// The witness string appended by the settlement contract, in declaration order.
	Appended,
}

/// Typehashes a hasher needs, one per struct it encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Typehashes {
	pub compact: B256,
	pub element: B256,
	pub lock: B256,
	pub mandate: B256,
	/// `Target` in the current shape, `Dest` in the older ones.
	pub target: B256,
	pub token: B256,
	pub op: B256,
}

pub const NO_OP_HASH: B256 =
	b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

const LOCK_TYPEHASH: B256 =
	b256!("fb7744571d97aa61eb9c2bc3c67b9b1ba047ac9e95afb2ef02bc5b3d9e64fbe5");
const OP_TYPEHASH: B256 =
	b256!("0e566a6f316e5e094e69d814664f5635daa1531cbcaa71a46bc8c9fa20ab2be6");
const TOKEN_TYPEHASH: B256 =
	b256!("55550a068ac7a6c7ce02eac46ebe7c7b964dd10d7800455df1c5bc5a6685a42c");
const DEST_TYPEHASH: B256 =
	b256!("f31ce097f6dc460bf61b6e6f69a70c82800a64fbd1c8f918c1bbb5a291e31bba");
const WITNESS_COMPACT_TYPEHASH: B256 =
	b256!("4e68b5f94568326f123b98cc674218034b0ad104191b3c5a466808fb30f6e9a0");
const WITNESS_ELEMENT_TYPEHASH: B256 =
	b256!("b737cc04f38312834b7b0bb120e81e5a84a333607d293e1fcac2084d70da0299");
const WITNESS_MANDATE_TYPEHASH: B256 =
	b256!("1c82886d3d0902b7aa88a30f07d2127bbbef080957680ae5bfb3ede21dc33d9c");
/// Token-out typehash of the execution-list shape. Its preimage was never
/// published, so it is checked only for being distinct and nonzero.
const EXECS_TOKEN_OUT_TYPEHASH: B256 =
	b256!("1915534d8e0225348ff204045b6f79a928be89e8c53411c56d29fa836d247826");

pub(crate) const TARGET_TYPEHASHES: Typehashes = Typehashes {
	compact: b256!("654edcedb9983ddb6403939959503e13bef74d3b6b06c685f21945f69092c28d"),
	element: b256!("a6cbac387409e21a51c770d449c652b12a6c4204236e7be2a94194f90df25791"),
	lock: LOCK_TYPEHASH,
	mandate: b256!("4757c111351140af95e7fb7923f835b099f0990c74645c4d7eb7375488c8695a"),
	target: b256!("9f8d8634c7fd8fcf40200ab5cb9558227d76154a640bd2762e0945326b7b60be"),
	token: TOKEN_TYPEHASH,
	op: OP_TYPEHASH,
};

pub(crate) const WITNESS_TYPEHASHES: Typehashes = Typehashes {
	compact: WITNESS_COMPACT_TYPEHASH,
	element: WITNESS_ELEMENT_TYPEHASH,
	lock: LOCK_TYPEHASH,
	mandate: WITNESS_MANDATE_TYPEHASH,
	target: DEST_TYPEHASH,
	token: TOKEN_TYPEHASH,
	op: OP_TYPEHASH,
};

pub(crate) const EXECS_TYPEHASHES: Typehashes = Typehashes {
	token: EXECS_TOKEN_OUT_TYPEHASH,
	..WITNESS_TYPEHASHES
};

const LOCK_DECL: TypeDecl = TypeDecl {
	name: "Lock",
	type_string: lock_type!(),
	typehash: LOCK_TYPEHASH,
};
const OP_DECL: TypeDecl = TypeDecl {
	name: "Op",
	type_string: op_type!(),
	typehash: OP_TYPEHASH,
};
const TOKEN_DECL: TypeDecl = TypeDecl {
	name: "Token",
	type_string: token_type!(),
	typehash: TOKEN_TYPEHASH,
};
const DEST_DECL: TypeDecl = TypeDecl {
	name: "Dest",
	type_string: concat!(dest_type!(), token_type!()),
	typehash: DEST_TYPEHASH,
};
const WITNESS_COMPACT_DECL: TypeDecl = TypeDecl {
	name: "MultichainCompact",
	type_string: concat!(
		compact_type!(),
		element_type!(),
		lock_type!(),
		dest_mandate_type!(),
		op_type!(),
		dest_type!(),
		token_type!()
	),
	typehash: WITNESS_COMPACT_TYPEHASH,
};
const WITNESS_ELEMENT_DECL: TypeDecl = TypeDecl {
	name: "Element",
	type_string: concat!(
		element_type!(),
		lock_type!(),
		dest_mandate_type!(),
		op_type!(),
		dest_type!(),
		token_type!()
	),
	typehash: WITNESS_ELEMENT_TYPEHASH,
};
const WITNESS_MANDATE_DECL: TypeDecl = TypeDecl {
	name: "Mandate",
	type_string: concat!(dest_mandate_type!(), op_type!(), dest_type!(), token_type!()),
	typehash: WITNESS_MANDATE_TYPEHASH,
};

static TARGET_DECLS: [TypeDecl; 7] = [
	TypeDecl {
		name: "MultichainCompact",
		type_string: concat!(
			compact_type!(),
			element_type!(),
			lock_type!(),
			target_mandate_type!(),
			op_type!(),
			target_type!(),
			token_type!()
		),
		typehash: TARGET_TYPEHASHES.compact,
	},
	TypeDecl {
		name: "Element",
		type_string: concat!(
			element_type!(),
			lock_type!(),
			target_mandate_type!(),
			op_type!(),
			target_type!(),
			token_type!()
		),
		typehash: TARGET_TYPEHASHES.element,
	},
	LOCK_DECL,
	TypeDecl {
		name: "Mandate",
		type_string: concat!(target_mandate_type!(), op_type!(), target_type!(), token_type!()),
		typehash: TARGET_TYPEHASHES.mandate,
	},
	OP_DECL,
	TypeDecl {
		name: "Target",
		type_string: concat!(target_type!(), token_type!()),
		typehash: TARGET_TYPEHASHES.target,
	},
	TOKEN_DECL,
];

static WITNESS_DECLS: [TypeDecl; 7] = [
	WITNESS_COMPACT_DECL,
	WITNESS_ELEMENT_DECL,
	LOCK_DECL,
	WITNESS_MANDATE_DECL,
	OP_DECL,
	DEST_DECL,
	TOKEN_DECL,
];

static EXECS_DECLS: [TypeDecl; 6] = [
	WITNESS_COMPACT_DECL,
	WITNESS_ELEMENT_DECL,
	LOCK_DECL,
	WITNESS_MANDATE_DECL,
	OP_DECL,
	DEST_DECL,
];

static EXECS_OPAQUE: [(&str, B256); 1] = [("TokenOut", EXECS_TOKEN_OUT_TYPEHASH)];

/// Encoding generation of the intent struct.
///
/// * `Witness`: the mandate is a witness appended by the settlement contract;
///   its type string is not sorted and the target struct is called `Dest`.
/// * `Execs`: same typehashes, but op lists are ABI-encoded `bytes32[]`,
///   token outputs use their own typehash and no claim proofer is signed.
/// * `Target`: plain EIP-712 with a `Target` struct. Used for new intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentSchema {
	Witness,
	Execs,
	#[default]
	Target,
}

impl IntentSchema {
	pub const ALL: [IntentSchema; 3] = [Self::Witness, Self::Execs, Self::Target];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Witness => "witness",
			Self::Execs => "execs",
			Self::Target => "target",
		}
	}

	pub fn typehashes(self) -> &'static Typehashes {
		match self {
			Self::Witness => &WITNESS_TYPEHASHES,
			Self::Execs => &EXECS_TYPEHASHES,
			Self::Target => &TARGET_TYPEHASHES,
		}
	}

	pub fn declarations(self) -> &'static [TypeDecl] {
		match self {
			Self::Witness => &WITNESS_DECLS,
			Self::Execs => &EXECS_DECLS,
			Self::Target => &TARGET_DECLS,
		}
	}

	/// Pinned typehashes with no known type string.
	pub fn opaque_typehashes(self) -> &'static [(&'static str, B256)] {
		match self {
			Self::Execs => &EXECS_OPAQUE,
			Self::Witness | Self::Target => &[],
		}
	}

	pub fn ordering(self) -> TypeOrdering {
		match self {
			Self::Target => TypeOrdering::Sorted,
			Self::Witness | Self::Execs => TypeOrdering::Appended,
		}
	}

	/// Checks every declared type string and pinned typehash of this schema.
	pub fn verify(self) -> Result<(), CompactError> {
		let fail = |message: String| CompactError::Schema {
			schema: self,
			message,
		};
		let decls = self.declarations();

		for decl in decls {
			check_declaration(decl, decls, self.ordering())
				.map_err(|message| fail(format!("{}: {}", decl.name, message)))?;
		}

		let hashes = self.typehashes();
		let used = [
			hashes.compact,
			hashes.element,
			hashes.lock,
			hashes.mandate,
			hashes.target,
			hashes.token,
			hashes.op,
		];
		let declared: HashSet<B256> = decls.iter().map(|decl| decl.typehash).collect();
		let opaque: HashSet<B256> = self.opaque_typehashes().iter().map(|(_, hash)| *hash).collect();
		for hash in used {
			if !declared.contains(&hash) && !opaque.contains(&hash) {
				return Err(fail(format!("typehash {} has no declaration", hash)));
			}
		}

		let mut seen = declared.clone();
		for (name, hash) in self.opaque_typehashes() {
			if hash.is_zero() {
				return Err(fail(format!("opaque typehash {} is zero", name)));
			}
			if !seen.insert(*hash) {
				return Err(fail(format!("opaque typehash {} collides", name)));
			}
		}

		Ok(())
	}
}

impl fmt::Display for IntentSchema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for IntentSchema {
	type Err = CompactError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|schema| schema.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| CompactError::UnknownSchema(s.to_string()))
	}
}

/// One `Name(type field,...)` group of a type string.
#[derive(Debug, PartialEq, Eq)]
struct Component<'a> {
	name: &'a str,
	text: &'a str,
	fields: Vec<(&'a str, &'a str)>,
}

fn is_identifier(s: &str) -> bool {
	let mut chars = s.chars();
	matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_atomic(ty: &str) -> bool {
	let sized = |rest: &str, max: u32, step: u32| {
		rest.parse::<u32>()
			.map(|n| n >= step && n <= max && n % step == 0 && !rest.starts_with('0'))
			.unwrap_or(false)
	};
	match ty {
		"address" | "bool" | "bytes" | "string" => true,
		_ => {
			if let Some(rest) = ty.strip_prefix("uint") {
				sized(rest, 256, 8)
			} else if let Some(rest) = ty.strip_prefix("int") {
				sized(rest, 256, 8)
			} else if let Some(rest) = ty.strip_prefix("bytes") {
				sized(rest, 32, 1)
			} else {
				false
			}
		}
	}
}

fn parse_components(type_string: &str) -> Result<Vec<Component<'_>>, String> {
	let mut components = Vec::new();
	let mut rest = type_string;

	while !rest.is_empty() {
		let open = rest
			.find('(')
			.ok_or_else(|| format!("missing '(' after '{}'", rest))?;
		let close = rest[open..]
			.find(')')
			.map(|offset| open + offset)
			.ok_or_else(|| format!("unterminated type '{}'", &rest[..open]))?;

		let name = &rest[..open];
		if !is_identifier(name) || !name.starts_with(|c: char| c.is_ascii_uppercase()) {
			return Err(format!("invalid type name '{}'", name));
		}

		let body = &rest[open + 1..close];
		let mut fields = Vec::new();
		if !body.is_empty() {
			for member in body.split(',') {
				let (ty, field) = member
					.split_once(' ')
					.ok_or_else(|| format!("member '{}' of {} has no name", member, name))?;
				let base = ty.strip_suffix("[]").unwrap_or(ty);
				if !is_identifier(base) || !is_identifier(field) {
					return Err(format!("malformed member '{}' of {}", member, name));
				}
				fields.push((ty, field));
			}
		}

		components.push(Component {
			name,
			text: &rest[..=close],
			fields,
		});
		rest = &rest[close + 1..];
	}

	Ok(components)
}

fn check_declaration(
	decl: &TypeDecl,
	all: &[TypeDecl],
	ordering: TypeOrdering,
) -> Result<(), String> {
	let components = parse_components(decl.type_string)?;
	let primary = components.first().ok_or("empty type string")?;
	if primary.name != decl.name {
		return Err(format!("primary type is '{}'", primary.name));
	}

	let mut declared = HashSet::new();
	for component in &components {
		if !declared.insert(component.name) {
			return Err(format!("type '{}' declared twice", component.name));
		}
		let mut field_names = HashSet::new();
		for (_, field) in &component.fields {
			if !field_names.insert(*field) {
				return Err(format!("duplicate member '{}' in {}", field, component.name));
			}
		}
	}

	let mut referenced = HashSet::new();
	for component in &components {
		for (ty, _) in &component.fields {
			let base = ty.strip_suffix("[]").unwrap_or(ty);
			if is_atomic(base) {
				continue;
			}
			if !declared.contains(base) {
				return Err(format!("'{}' references undeclared type '{}'", component.name, base));
			}
			referenced.insert(base);
		}
	}
	for component in &components[1..] {
		if !referenced.contains(component.name) {
			return Err(format!("type '{}' is never referenced", component.name));
		}
	}

	if ordering == TypeOrdering::Sorted && components[1..].windows(2).any(|w| w[0].name > w[1].name) {
		return Err("referenced types are not sorted".to_string());
	}

	// A nested struct must read exactly as its own declaration.
	for component in &components[1..] {
		if let Some(own) = all.iter().find(|other| other.name == component.name) {
			let own_primary = parse_components(own.type_string)?;
			if own_primary.first().map(|c| c.text) != Some(component.text) {
				return Err(format!("'{}' differs from its own declaration", component.name));
			}
		}
	}

	let derived = keccak256(decl.type_string);
	if derived != decl.typehash {
		return Err(format!(
			"pinned typehash {} does not match derived {}",
			decl.typehash, derived
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_all_schemas_verify() {
		for schema in IntentSchema::ALL {
			schema.verify().unwrap();
		}
	}

	#[test]
	fn test_target_strings_are_eip712_encoded() {
		let compact = &TARGET_DECLS[0];
		assert_eq!(
			compact.type_string,
			"MultichainCompact(address sponsor,uint256 nonce,uint256 expires,Element[] elements)\
			 Element(address arbiter,uint256 chainId,Lock[] commitments,Mandate mandate)\
			 Lock(bytes12 lockTag,address token,uint256 amount)\
			 Mandate(Target target,Op[] originOps,Op[] destOps,bytes32 q)\
			 Op(address to,uint256 value,bytes data)\
			 Target(address recipient,Token[] tokenOut,uint256 targetChain,uint256 fillExpiry,address claimProofer)\
			 Token(address token,uint256 amount)"
		);
	}

	#[test]
	fn test_witness_strings_are_not_sorted() {
		let mandate = WITNESS_DECLS
			.iter()
			.find(|decl| decl.name == "Mandate")
			.unwrap();
		let components = parse_components(mandate.type_string).unwrap();
		let names: Vec<_> = components.iter().map(|c| c.name).collect();
		assert_eq!(names, vec!["Mandate", "Op", "Dest", "Token"]);
	}

	#[test]
	fn test_rejects_malformed_strings() {
		let all = TARGET_DECLS;
		let mut decl = TARGET_DECLS[5];

		decl.type_string = "Target(address recipient,Token[] tokenOut,uint256 targetChain,uint256 fillExpiry,address claimProofer)";
		assert!(check_declaration(&decl, &all, TypeOrdering::Sorted)
			.unwrap_err()
			.contains("undeclared type 'Token'"));

		decl.type_string = "Target(address recipient,address recipient)";
		assert!(check_declaration(&decl, &all, TypeOrdering::Sorted)
			.unwrap_err()
			.contains("duplicate member"));

		decl.type_string = "Target(uint257 amount)";
		assert!(check_declaration(&decl, &all, TypeOrdering::Sorted).is_err());

		decl.type_string = "Target(address recipient";
		assert!(check_declaration(&decl, &all, TypeOrdering::Sorted).is_err());
	}

	#[test]
	fn test_rejects_mismatched_pin() {
		let all = TARGET_DECLS;
		let mut decl = TARGET_DECLS[4];
		decl.typehash = TOKEN_TYPEHASH;
		let err = check_declaration(&decl, &all, TypeOrdering::Sorted).unwrap_err();
		assert!(err.contains("does not match"));
	}

	#[test]
	fn test_rejects_drifted_nested_type() {
		let all = TARGET_DECLS;
		let mut decl = TARGET_DECLS[3];
		// Op declared with different members inside Mandate.
		decl.type_string = concat!(
			target_mandate_type!(),
			"Op(address to,uint256 value)",
			target_type!(),
			token_type!()
		);
		let err = check_declaration(&decl, &all, TypeOrdering::Sorted).unwrap_err();
		assert!(err.contains("differs from its own declaration"));
	}

	#[test]
	fn test_execs_shares_witness_hashes() {
		let witness = IntentSchema::Witness.typehashes();
		let execs = IntentSchema::Execs.typehashes();
		assert_eq!(witness.compact, execs.compact);
		assert_eq!(witness.mandate, execs.mandate);
		assert_ne!(witness.token, execs.token);
	}

	#[test]
	fn test_parses_schema_names() {
		assert_eq!("Target".parse::<IntentSchema>().unwrap(), IntentSchema::Target);
		assert_eq!(" execs ".parse::<IntentSchema>().unwrap(), IntentSchema::Execs);
		assert!("segments".parse::<IntentSchema>().is_err());
		assert_eq!(IntentSchema::default(), IntentSchema::Target);
	}
}
