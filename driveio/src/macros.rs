// SPDX-License-Identifier: MIT

/// Generates little-endian `read_<ty>_at` helpers on DriveIO.
#[macro_export]
macro_rules! driveio_impl_primitive_read {
    ($($ty:ty),+ $(,)?) => {
        $(
            ::paste::paste! {
                #[inline(always)]
                fn [<read_ $ty _at>](&mut self, offset: u64) -> DriveIOResult<$ty> {
                    let mut buf = [0u8; core::mem::size_of::<$ty>()];
                    self.read_at(offset, &mut buf)?;
                    Ok(<$ty>::from_le_bytes(buf))
                }
            }
        )+
    };
}
