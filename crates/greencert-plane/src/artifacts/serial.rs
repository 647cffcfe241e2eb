use uuid::Uuid;

use super::SerialCodeGenerator;

/// Serial codes are random UUID v4 strings
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSerialCodes;

impl SerialCodeGenerator for UuidSerialCodes {
    fn next_serial(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
