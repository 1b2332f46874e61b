//! Reader/writer for the fixed six-field little-endian particle record
//! format documented in spec §6/§6.1. Gated behind the `codec` feature so
//! the default build carries no I/O surface; a driver is free to ignore
//! this module and implement its own reader against the same layout.
//!
//! Record layout, per particle, in file order: `pos_x, pos_y, mass, vel_x,
//! vel_y, brightness`, each an IEEE-754 `binary64`. File length is exactly
//! `6 * 8 * N` bytes. `brightness` is opaque to the simulation core and is
//! carried alongside [`ParticleSet`] rather than folded into it, since
//! nothing in the force kernel or integrator reads it.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::BhResult;
use crate::particles::ParticleSet;

const FIELDS_PER_RECORD: usize = 6;
const BYTES_PER_FIELD: usize = 8;

/// A particle set paired with the per-particle `brightness` field that the
/// core does not otherwise carry (spec §6).
pub struct RecordSet {
    pub particles: ParticleSet,
    pub brightness: Vec<f64>,
}

/// Reads every record from `reader` until EOF. Returns `Io` if the stream
/// length is not a multiple of the record size.
pub fn read_records<R: Read>(mut reader: R) -> BhResult<RecordSet> {
    let mut pos_x = Vec::new();
    let mut pos_y = Vec::new();
    let mut mass = Vec::new();
    let mut vel_x = Vec::new();
    let mut vel_y = Vec::new();
    let mut brightness = Vec::new();

    loop {
        let x = match reader.read_f64::<LittleEndian>() {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };
        let y = reader.read_f64::<LittleEndian>()?;
        let m = reader.read_f64::<LittleEndian>()?;
        let vx = reader.read_f64::<LittleEndian>()?;
        let vy = reader.read_f64::<LittleEndian>()?;
        let b = reader.read_f64::<LittleEndian>()?;

        pos_x.push(x);
        pos_y.push(y);
        mass.push(m);
        vel_x.push(vx);
        vel_y.push(vy);
        brightness.push(b);
    }

    Ok(RecordSet { particles: ParticleSet::new(pos_x, pos_y, mass, vel_x, vel_y), brightness })
}

/// Writes `records` to `writer` in the documented field order, one record
/// per particle. `brightness.len()` must equal `records.particles.len()`.
pub fn write_records<W: Write>(mut writer: W, records: &RecordSet) -> BhResult<()> {
    debug_assert_eq!(records.brightness.len(), records.particles.len());
    let p = &records.particles;
    for i in 0..p.len() {
        writer.write_f64::<LittleEndian>(p.pos_x[i])?;
        writer.write_f64::<LittleEndian>(p.pos_y[i])?;
        writer.write_f64::<LittleEndian>(p.mass[i])?;
        writer.write_f64::<LittleEndian>(p.vel_x[i])?;
        writer.write_f64::<LittleEndian>(p.vel_y[i])?;
        writer.write_f64::<LittleEndian>(records.brightness[i])?;
    }
    Ok(())
}

/// Expected byte length of a file holding `n` particle records.
pub fn expected_len_bytes(n: usize) -> usize {
    n * FIELDS_PER_RECORD * BYTES_PER_FIELD
}
