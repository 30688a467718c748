//! Field-by-field little-endian encoding of the animation buffers

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Mat4, Quat, Vec3};
use std::io::{Read, Write};

use crate::error::{AnimError, Result};
use crate::transform::Transform;
use crate::weight_volume::WeightVolume;

pub trait BinaryRead: Sized {
    fn binary_read<R: Read>(reader: &mut R) -> Result<Self>;
}

pub trait BinaryWrite {
    fn binary_write<W: Write>(&self, writer: &mut W) -> Result<()>;
    fn binary_size(&self) -> usize;
}

pub trait BinaryReaderExt: Read + Sized {
    fn binary_read<T: BinaryRead>(&mut self) -> Result<T> {
        T::binary_read(self)
    }
}

impl<R: Read> BinaryReaderExt for R {}

pub trait BinaryWriterExt: Write + Sized {
    fn binary_write<T: BinaryWrite>(&mut self, value: &T) -> Result<()> {
        value.binary_write(self)
    }
}

impl<W: Write> BinaryWriterExt for W {}

impl BinaryRead for u64 {
    fn binary_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u64::<LittleEndian>()?)
    }
}
impl BinaryWrite for u64 {
    fn binary_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<LittleEndian>(*self)?;
        Ok(())
    }

    fn binary_size(&self) -> usize {
        8
    }
}

impl BinaryRead for f32 {
    fn binary_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_f32::<LittleEndian>()?)
    }
}
impl BinaryWrite for f32 {
    fn binary_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32::<LittleEndian>(*self)?;
        Ok(())
    }

    fn binary_size(&self) -> usize {
        4
    }
}

impl BinaryRead for bool {
    fn binary_read<R: Read>(reader: &mut R) -> Result<Self> {
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(AnimError::InvalidBool(other)),
        }
    }
}
impl BinaryWrite for bool {
    fn binary_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(u8::from(*self))?;
        Ok(())
    }

    fn binary_size(&self) -> usize {
        1
    }
}

impl BinaryRead for Vec3 {
    fn binary_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self::new(
            reader.binary_read()?,
            reader.binary_read()?,
            reader.binary_read()?,
        ))
    }
}
impl BinaryWrite for Vec3 {
    fn binary_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.binary_write(&self.x)?;
        writer.binary_write(&self.y)?;
        writer.binary_write(&self.z)?;
        Ok(())
    }

    fn binary_size(&self) -> usize {
        0_f32.binary_size() * 3
    }
}

/// Stored as x, y, z, w
impl BinaryRead for Quat {
    fn binary_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self::from_xyzw(
            reader.binary_read()?,
            reader.binary_read()?,
            reader.binary_read()?,
            reader.binary_read()?,
        ))
    }
}
impl BinaryWrite for Quat {
    fn binary_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        for component in self.to_array() {
            writer.binary_write(&component)?;
        }
        Ok(())
    }

    fn binary_size(&self) -> usize {
        0_f32.binary_size() * 4
    }
}

/// Stored column-major
impl BinaryRead for Mat4 {
    fn binary_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut cols = [0.0_f32; 16];
        for value in &mut cols {
            *value = reader.binary_read()?;
        }
        Ok(Self::from_cols_array(&cols))
    }
}
impl BinaryWrite for Mat4 {
    fn binary_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        for value in self.to_cols_array() {
            writer.binary_write(&value)?;
        }
        Ok(())
    }

    fn binary_size(&self) -> usize {
        0_f32.binary_size() * 16
    }
}

impl BinaryRead for Transform {
    fn binary_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self::new(
            reader.binary_read()?,
            reader.binary_read()?,
            reader.binary_read()?,
        ))
    }
}
impl BinaryWrite for Transform {
    fn binary_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.binary_write(&self.position)?;
        writer.binary_write(&self.rotation)?;
        writer.binary_write(&self.scale)?;
        Ok(())
    }

    fn binary_size(&self) -> usize {
        self.position.binary_size() + self.rotation.binary_size() + self.scale.binary_size()
    }
}

/// The cached squared length is not stored, it is rebuilt on read
impl BinaryRead for WeightVolume {
    fn binary_read<R: Read>(reader: &mut R) -> Result<Self> {
        let start_point = reader.binary_read()?;
        let start_to_end = reader.binary_read()?;
        let falloff_rate = reader.binary_read()?;
        Ok(Self::new(start_point, start_to_end, falloff_rate))
    }
}
impl BinaryWrite for WeightVolume {
    fn binary_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.binary_write(&self.start_point)?;
        writer.binary_write(&self.start_to_end())?;
        writer.binary_write(&self.falloff_rate)?;
        Ok(())
    }

    fn binary_size(&self) -> usize {
        self.start_point.binary_size() * 2 + self.falloff_rate.binary_size()
    }
}
