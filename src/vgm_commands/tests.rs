#[cfg(test)]
mod tests {
    use crate::errors::VgmError;
    use crate::parser_config::ParserConfig;
    use crate::vgm_commands::data_blocks::{classify, DataBlockFamily};
    use crate::vgm_commands::opcodes::{length_of, lookup, reserved_length, LengthRule};
    use crate::vgm_commands::{DecodedCommand, StreamWalker, Termination, WalkState};
    use bytes::{BufMut, Bytes, BytesMut};
    use proptest::prelude::*;

    fn fixed_opcodes() -> Vec<u8> {
        (0..=255u8)
            .filter(|&opcode| opcode != 0x66 && matches!(length_of(opcode), LengthRule::Fixed(_)))
            .collect()
    }

    fn fixed_command() -> impl Strategy<Value = Vec<u8>> {
        prop::sample::select(fixed_opcodes()).prop_flat_map(|opcode| {
            let LengthRule::Fixed(length) = length_of(opcode) else {
                unreachable!("only fixed opcodes are selected")
            };
            prop::collection::vec(any::<u8>(), length - 1).prop_map(move |operands| {
                let mut bytes = vec![opcode];
                bytes.extend(operands);
                bytes
            })
        })
    }

    fn data_block() -> impl Strategy<Value = Vec<u8>> {
        (any::<u8>(), prop::collection::vec(any::<u8>(), 0..64)).prop_map(|(block_type, payload)| {
            let mut buffer = BytesMut::new();
            buffer.put_u8(0x67);
            buffer.put_u8(0x66);
            buffer.put_u8(block_type);
            buffer.put_u32_le(payload.len() as u32);
            buffer.put_slice(&payload);
            buffer.to_vec()
        })
    }

    fn pcm_ram_write() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>(), 10).prop_map(|fields| {
            let mut bytes = vec![0x68, 0x66];
            bytes.extend(fields);
            bytes
        })
    }

    fn command() -> impl Strategy<Value = Vec<u8>> {
        prop_oneof![
            6 => fixed_command(),
            2 => data_block(),
            1 => pcm_ram_write(),
        ]
    }

    /// Commands followed by an end of sound data marker
    fn command_stream() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<u8>)> {
        prop::collection::vec(command(), 0..40).prop_map(|commands| {
            let mut stream: Vec<u8> = commands.concat();
            stream.push(0x66);
            (commands, stream)
        })
    }

    fn walk_all(stream: &[u8], config: ParserConfig) -> (Vec<DecodedCommand>, StreamWalker) {
        let mut walker = StreamWalker::new(Bytes::copy_from_slice(stream), 0, config);
        let decoded = walker
            .by_ref()
            .collect::<Result<Vec<_>, VgmError>>()
            .unwrap();
        (decoded, walker)
    }

    proptest! {
        #[test]
        fn classification_is_total(block_type in any::<u8>()) {
            let category = classify(block_type);
            prop_assert!(!category.label.is_empty());
            let expected = match block_type {
                0x00..=0x3F => DataBlockFamily::BasePcm,
                0x40..=0x7E => DataBlockFamily::CompressedPcm,
                0x7F => DataBlockFamily::Unknown,
                0x80..=0xBF => DataBlockFamily::RomRamContent,
                _ => DataBlockFamily::RamWrite,
            };
            prop_assert_eq!(category.family, expected);
            prop_assert_eq!(classify(block_type), category);
        }

        #[test]
        fn lengths_sum_to_stream_length((commands, stream) in command_stream()) {
            let (decoded, walker) = walk_all(&stream, ParserConfig::default());

            prop_assert_eq!(decoded.len(), commands.len() + 1);
            prop_assert_eq!(walker.state(), WalkState::Done(Termination::EndOfStream));

            let total: usize = decoded.iter().map(|d| d.length()).sum();
            prop_assert_eq!(total, stream.len());
            prop_assert_eq!(walker.cursor(), stream.len());

            for (expected, actual) in commands.iter().zip(&decoded) {
                prop_assert_eq!(expected.len(), actual.length());
            }
        }

        #[test]
        fn data_blocks_reencode_to_their_source_bytes((_, stream) in command_stream()) {
            let (decoded, _) = walk_all(&stream, ParserConfig::default());

            for block in decoded.iter().filter_map(DecodedCommand::as_data_block) {
                prop_assert_eq!(block.payload.len(), block.declared_size as usize);
                let source = &stream[block.offset..block.offset + block.length()];
                let encoded = block.to_bytes();
                prop_assert_eq!(&encoded[..], source);
            }
        }

        #[test]
        fn command_budget_fails_on_next_command((commands, stream) in command_stream(), limit in 0usize..8) {
            prop_assume!(commands.len() + 1 > limit);
            let config = ParserConfig { max_commands: Some(limit), ..Default::default() };
            let walker = StreamWalker::new(Bytes::copy_from_slice(&stream), 0, config);
            let items: Vec<_> = walker.collect();

            prop_assert_eq!(items.len(), limit + 1);
            prop_assert!(items[..limit].iter().all(|item| item.is_ok()));
            let is_budget_error = matches!(
                items[limit],
                Err(VgmError::DataSizeExceedsLimit { .. })
            );
            prop_assert!(is_budget_error);
        }

        #[test]
        fn reserved_opcodes_skip_documented_width(
            opcode in prop::sample::select(
                (0..=255u8).filter(|op| reserved_length(*op).is_some()).collect::<Vec<_>>()
            ),
            operands in prop::collection::vec(any::<u8>(), 4),
        ) {
            let width = reserved_length(opcode).unwrap();
            let mut stream = vec![opcode];
            stream.extend(&operands[..width - 1]);
            stream.push(0x66);

            let (decoded, walker) = walk_all(&stream, ParserConfig::permissive());
            prop_assert_eq!(decoded[0].length(), width);
            prop_assert_eq!(walker.state(), WalkState::Done(Termination::EndOfStream));
        }

        #[test]
        fn lookup_never_invents_lengths(opcode in any::<u8>()) {
            match lookup(opcode, true) {
                LengthRule::Fixed(length) => prop_assert!(length >= 1 && length <= 11),
                LengthRule::Unknown => {
                    prop_assert!(reserved_length(opcode).is_none());
                    prop_assert_eq!(length_of(opcode), LengthRule::Unknown);
                },
                LengthRule::DataBlock | LengthRule::PcmRamWrite => {
                    prop_assert!(opcode == 0x67 || opcode == 0x68);
                },
            }
        }
    }

    #[test]
    fn test_truncated_fixed_command_reports_available_bytes() {
        let walker = StreamWalker::new(Bytes::from_static(&[0x62, 0x93, 0x00, 0x01]), 0, ParserConfig::default());
        let items: Vec<_> = walker.collect();
        match &items[1] {
            Err(VgmError::IncompleteCommand { opcode, offset, expected_bytes, available_bytes }) => {
                assert_eq!(*opcode, 0x93);
                assert_eq!(*offset, 1);
                assert_eq!(*expected_bytes, 11);
                assert_eq!(*available_bytes, 3);
            },
            other => panic!("Expected IncompleteCommand, got {:?}", other),
        }
    }

    #[test]
    fn test_block_after_earlier_block_keeps_numbering_in_stream_order() {
        let stream = [
            0x67, 0x66, 0x00, 0x01, 0, 0, 0, 0xA1, // YM2612 PCM
            0x61, 0x10, 0x00, // wait
            0x67, 0x66, 0xC0, 0x02, 0, 0, 0, 0xB1, 0xB2, // RF5C68 RAM write
            0x66,
        ];
        let (decoded, _) = walk_all(&stream, ParserConfig::default());
        let labels: Vec<_> = decoded
            .iter()
            .filter_map(DecodedCommand::as_data_block)
            .map(|block| (block.offset, block.category.label))
            .collect();
        assert_eq!(labels, vec![(0, "YM2612 PCM data"), (11, "RF5C68 RAM write")]);
    }

    #[test]
    fn test_zero_length_data_block() {
        let (decoded, walker) = walk_all(&[0x67, 0x66, 0x07, 0, 0, 0, 0, 0x66], ParserConfig::default());
        let block = decoded[0].as_data_block().unwrap();
        assert!(block.payload.is_empty());
        assert_eq!(block.category.label, "NES APU DPCM data");
        assert_eq!(walker.cursor(), 8);
    }
}
