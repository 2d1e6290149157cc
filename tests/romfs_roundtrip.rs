//! End-to-end test: build a ROM image from real host files through the
//! public `bbctape::romfs` API and read it back with the same walking logic
//! a ROM-resident reader would use, checking the recovered bytes and names
//! match what went in.

use bbctape::block::{BlockFlags, BlockHeader, CONTINUATION_BYTE, MAX_BLOCK_LENGTH, ROM_TERMINATOR, SYNC_BYTE};
use bbctape::romfs::RomFsBuilder;
use std::io::Cursor;

fn read_entry(image: &[u8], mut pos: usize) -> (String, Vec<u8>, usize) {
    assert_eq!(image[pos], SYNC_BYTE);
    pos += 1;
    let mut cur = Cursor::new(&image[pos..]);
    let mut header = BlockHeader::decode_full(&mut cur, None).unwrap().0;
    pos += cur.position() as usize;

    if header.flags.contains(BlockFlags::EMPTY) && header.block_len == 0 {
        return (header.name, Vec::new(), pos);
    }

    let mut data = Vec::new();
    data.extend_from_slice(&image[pos..pos + header.block_len as usize]);
    pos += header.block_len as usize + 2;

    while !header.flags.contains(BlockFlags::FINAL) {
        let marker = image[pos];
        pos += 1;
        if marker == CONTINUATION_BYTE {
            data.extend_from_slice(&image[pos..pos + MAX_BLOCK_LENGTH]);
            pos += MAX_BLOCK_LENGTH + 2;
        } else {
            assert_eq!(marker, SYNC_BYTE);
            let mut cur = Cursor::new(&image[pos..]);
            header = BlockHeader::decode_full(&mut cur, None).unwrap().0;
            pos += cur.position() as usize;
            data.extend_from_slice(&image[pos..pos + header.block_len as usize]);
            pos += header.block_len as usize + 2;
        }
    }
    (header.name, data, pos)
}

fn walk_romfs(image: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut pos = 0;
    let mut entries = Vec::new();
    while image[pos] != ROM_TERMINATOR {
        let (name, data, next) = read_entry(image, pos);
        entries.push((name, data));
        pos = next;
    }
    entries
}

#[test]
fn packs_several_host_files_and_reads_them_back_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();

    let small_path = dir.path().join("loader.bas");
    std::fs::write(&small_path, b"10 PRINT \"HELLO\"\n20 END\n").unwrap();

    let big_path = dir.path().join("data.bin");
    let big_contents: Vec<u8> = (0..(MAX_BLOCK_LENGTH * 3 + 17)).map(|i| (i * 7) as u8).collect();
    std::fs::write(&big_path, &big_contents).unwrap();

    let mut builder = RomFsBuilder::new(0x8000);
    builder.add_title("DEMO DISC 1").unwrap();
    builder.add_file(&format!("LOADER={}", small_path.display()), 0x1900, 0x1900).unwrap();
    builder.add_file(&format!("DATA={}", big_path.display()), 0, 0).unwrap();
    let image = builder.finish();

    assert_eq!(*image.last().unwrap(), ROM_TERMINATOR);

    let entries = walk_romfs(&image);
    assert_eq!(entries[0], ("DEMO DISC 1".to_string(), Vec::new()));
    assert_eq!(entries[1], ("LOADER".to_string(), b"10 PRINT \"HELLO\"\n20 END\n".to_vec()));
    assert_eq!(entries[2], ("DATA".to_string(), big_contents));
}

#[test]
fn building_twice_with_the_same_target_name_fails_the_second_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.bas");
    std::fs::write(&path, b"x").unwrap();

    let mut builder = RomFsBuilder::new(0);
    builder.add_file(&format!("SAME={}", path.display()), 0, 0).unwrap();
    assert!(builder.add_file(&format!("SAME={}", path.display()), 0, 0).is_err());
}
