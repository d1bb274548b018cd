//! Golden byte vectors for the operation wire format.
//!
//! Each test builds an operation, checks the exact canonical bytes, and
//! decodes them back field by field.

use chainwire_core::Args;
use chainwire_ops::{
    operation::signing_hash, populate_datastore, Address, ContractDeployment, KeyPair,
    OperationDetails, OperationKind, OperationType, SignedOperation,
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn hex_to_bytes(s: &str) -> Vec<u8> {
    let s: String = s.split_whitespace().collect();
    hex::decode(&s).unwrap_or_else(|e| panic!("bad hex '{s}': {e}"))
}

fn check(details: &OperationDetails, expected_hex: &str) {
    let bytes = details.serialize();
    assert_eq!(hex::encode(&bytes), hex::encode(hex_to_bytes(expected_hex)));
    assert_eq!(&OperationDetails::deserialize(&bytes).unwrap(), details);
}

// ─── Variants ─────────────────────────────────────────────────────────────────

#[test]
fn transfer_golden() {
    let details = OperationDetails {
        fee: 10_000_000,
        expire_period: 1234,
        kind: OperationKind::Transaction {
            recipient: Address::user([0x11; 32]),
            amount: 1_000_000_000,
        },
    };
    check(
        &details,
        "80ade204 d209 00
         0000 1111111111111111111111111111111111111111111111111111111111111111
         8094ebdc03",
    );
}

#[test]
fn roll_buy_golden() {
    let details = OperationDetails {
        fee: 0,
        expire_period: 1234,
        kind: OperationKind::RollBuy { count: 5 },
    };
    check(&details, "00 d209 01 05");
}

#[test]
fn roll_sell_golden() {
    let details = OperationDetails {
        fee: 1,
        expire_period: 2,
        kind: OperationKind::RollSell { count: 128 },
    };
    check(&details, "01 02 02 8001");
}

#[test]
fn call_golden() {
    let details = OperationDetails {
        fee: 0,
        expire_period: 1234,
        kind: OperationKind::CallSmartContractFunction {
            max_gas: 2_100_000,
            coins: 0,
            target: Address::contract([0x22; 32]),
            function: "hi".into(),
            parameter: Args::new().add_u64(42).into_bytes(),
        },
    };
    check(
        &details,
        "00 d209 04 a0968001 00
         0100 2222222222222222222222222222222222222222222222222222222222222222
         02 6869
         08 2a00000000000000",
    );
    assert_eq!(details.operation_type(), OperationType::CallSmartContractFunction);
}

#[test]
fn execute_golden() {
    let mut datastore = chainwire_ops::Datastore::new();
    datastore.insert(vec![0x00], 1u64.to_le_bytes().to_vec()).unwrap();
    let details = OperationDetails {
        fee: 0,
        expire_period: 1,
        kind: OperationKind::ExecuteSmartContractBytecode {
            max_gas: 300,
            max_coins: 0,
            bytecode: vec![0xDE, 0xAD],
            datastore,
        },
    };
    check(&details, "00 01 03 ac02 00 02dead 01 0100 080100000000000000");
}

#[test]
fn deployer_datastore_golden() {
    let datastore = populate_datastore(&[ContractDeployment {
        bytecode: vec![0xAA],
        args: vec![],
        coins: 3,
    }])
    .unwrap();
    let details = OperationDetails {
        fee: 0,
        expire_period: 0,
        kind: OperationKind::ExecuteSmartContractBytecode {
            max_gas: 0,
            max_coins: 0,
            bytecode: vec![],
            datastore,
        },
    };
    check(
        &details,
        "00 00 03 00 00 00
         04
         0100 080100000000000000
         080100000000000000 01aa
         0d 0100000000000000 01000000 00 00
         0d 0100000000000000 01000000 01 08 0300000000000000",
    );
}

// ─── Signing ──────────────────────────────────────────────────────────────────

#[test]
fn signing_preimage_layout() {
    let key = KeyPair::from_secret_bytes(&[5; 32]);
    let details = OperationDetails {
        fee: 0,
        expire_period: 1234,
        kind: OperationKind::RollBuy { count: 5 },
    };
    let signed = SignedOperation::sign(details, &key, 77_658_366);

    let mut preimage = 77_658_366u64.to_be_bytes().to_vec();
    preimage.push(0x00);
    preimage.extend_from_slice(key.public_key().as_raw());
    preimage.extend_from_slice(&hex_to_bytes("00 d209 01 05"));

    let expected = *blake3::hash(&preimage).as_bytes();
    assert_eq!(signed.id().as_bytes(), &expected);
    assert_eq!(signing_hash(77_658_366, key.public_key(), signed.content()), expected);
    key.public_key().verify(&expected, signed.signature()).unwrap();
    assert!(signed.id().to_string().starts_with('O'));
}

// ─── Published vectors ────────────────────────────────────────────────────────

/// RFC 8032 §7.1 TEST 1/2/3: Ed25519 secret key to public key.
#[test]
fn rfc8032_public_keys() {
    let vectors = [
        (
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
        ),
        (
            "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb",
            "3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c",
        ),
        (
            "c5aa8df43f9f837bedb7442f31dcb7b166d38535076f094b85ce3a2e0b4458f7",
            "fc51cd8e6218a1a38da47ed00230f0580816ed13ba3303ac5deb911548908025",
        ),
    ];
    for (secret, public) in vectors {
        let secret: [u8; 32] = hex_to_bytes(secret).try_into().unwrap();
        let key = KeyPair::from_secret_bytes(&secret);
        assert_eq!(hex::encode(key.public_key().as_raw()), public);

        let mut versioned = vec![0x00];
        versioned.extend_from_slice(&hex_to_bytes(public));
        assert_eq!(key.public_key().to_bytes(), versioned);
    }
}

/// RFC 8032 TEST 1 key over a 32-byte digest; the signature was produced with
/// an independent Ed25519 implementation (pyca/cryptography).
#[test]
fn rfc8032_key_signs_digest() {
    let secret: [u8; 32] =
        hex_to_bytes("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
            .try_into()
            .unwrap();
    let key = KeyPair::from_secret_bytes(&secret);
    let signature = key.sign(&[0x11; 32]);
    assert_eq!(
        hex::encode(signature.to_raw()),
        "0afd2513725fa762b643979705fbf41cc65fca4fe4fb45bd1db180be3a137af7\
         69e703c281a1c712290e164f237132e9611be034942081faee34183e03089507"
    );
    key.public_key().verify(&[0x11; 32], &signature).unwrap();
}

/// Name service contracts as published for mainnet and buildnet.
#[test]
fn published_contract_addresses() {
    let vectors = [
        (
            "AS1q5hUfxLXNXLKsYQVXZLK7MPUZcWaNZZsK7e9QzqhGdAgLpUGT",
            "6d2c7d5a60318510cae22a3f7129dae199dd22be3c534766af63e03aecd48f3f",
        ),
        (
            "AS12qKAVjU1nr66JSkQ6N4Lqu4iwuVc6rAbRTrxFoynPrPdP1sj3G",
            "f165a5393f3c9040245c0f219073b352d2b57684199609449e18a6ee47244598",
        ),
    ];
    for (text, hash) in vectors {
        let address: Address = text.parse().unwrap();
        assert!(address.is_contract());
        assert_eq!(hex::encode(address.hash()), hash);
        assert_eq!(address.to_string(), text);
        assert_eq!(hex::encode(address.to_bytes()), format!("0100{hash}"));
    }
}
