//! Integration tests for HLS segment decryption.
//!
//! Tests cover:
//! - Default IV derivation from the media sequence number
//! - AES-128-CBC decryption with explicit and default IVs
//! - Reassembly of a multi-segment encrypted stream

use aes::Aes128;
use anigrab::core::hls::{decrypt_segment, default_iv};
use block_modes::block_padding::Pkcs7;
use block_modes::{BlockMode, Cbc};

type Aes128Cbc = Cbc<Aes128, Pkcs7>;

const KEY: [u8; 16] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
    0x3c,
];

fn encrypt(plaintext: &[u8], iv: &[u8; 16]) -> Vec<u8> {
    Aes128Cbc::new_from_slices(&KEY, iv)
        .expect("valid key/iv")
        .encrypt_vec(plaintext)
}

// ========== DEFAULT IV ==========

#[test]
fn test_default_iv_encodes_sequence_big_endian() {
    assert_eq!(default_iv(0), [0u8; 16]);

    let iv = default_iv(1);
    assert_eq!(&iv[..15], &[0u8; 15]);
    assert_eq!(iv[15], 1);

    let iv = default_iv(0x1234_5678);
    assert_eq!(&iv[..8], &[0u8; 8]);
    assert_eq!(&iv[12..], &[0x12, 0x34, 0x56, 0x78]);
}

// ========== DECRYPTION ==========

#[test]
fn test_decrypt_with_explicit_iv() {
    let iv = [0x42u8; 16];
    let plaintext = b"segment payload that is not block aligned";
    let encrypted = encrypt(plaintext, &iv);

    let decrypted = decrypt_segment(&encrypted, &KEY, Some(&iv), 999).expect("decrypts");
    assert_eq!(decrypted, plaintext);
}

#[test]
fn test_decrypt_falls_back_to_sequence_iv() {
    let plaintext = b"payload for the seventh segment";
    let encrypted = encrypt(plaintext, &default_iv(7));

    let decrypted = decrypt_segment(&encrypted, &KEY, None, 7).expect("decrypts");
    assert_eq!(decrypted, plaintext);
}

#[test]
fn test_decrypt_empty_iv_treated_as_absent() {
    let plaintext = b"payload";
    let encrypted = encrypt(plaintext, &default_iv(3));

    let decrypted = decrypt_segment(&encrypted, &KEY, Some(&[]), 3).expect("decrypts");
    assert_eq!(decrypted, plaintext);
}

#[test]
fn test_decrypt_rejects_bad_key_length() {
    let encrypted = encrypt(b"payload", &default_iv(0));
    assert!(decrypt_segment(&encrypted, &[0u8; 7], None, 0).is_err());
}

#[test]
fn test_multi_segment_stream_reassembles() {
    let segments: Vec<&[u8]> = vec![
        b"first segment of the episode....",
        b"second segment, different bytes",
        b"third and final segment payload",
    ];

    let encrypted: Vec<Vec<u8>> = segments
        .iter()
        .enumerate()
        .map(|(seq, seg)| encrypt(seg, &default_iv(seq as u64)))
        .collect();

    let mut reassembled = Vec::new();
    for (seq, enc) in encrypted.iter().enumerate() {
        let dec = decrypt_segment(enc, &KEY, None, seq as u64).expect("decrypts");
        reassembled.extend_from_slice(&dec);
    }

    let expected: Vec<u8> = segments.concat();
    assert_eq!(reassembled, expected);
}
