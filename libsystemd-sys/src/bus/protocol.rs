use super::c_int;

pub const _SD_BUS_MESSAGE_TYPE_INVALID: c_int = 0;
pub const SD_BUS_MESSAGE_METHOD_CALL: c_int = 1;
pub const SD_BUS_MESSAGE_METHOD_RETURN: c_int = 2;
pub const SD_BUS_MESSAGE_METHOD_ERROR: c_int = 3;
pub const SD_BUS_MESSAGE_SIGNAL: c_int = 4;
pub const _SD_BUS_MESSAGE_TYPE_MAX: c_int = 5;

// Type codes as returned by `sd_bus_message_peek_type()`. Structs and dict entries are reported
// as 'r' and 'e', not by their signature delimiters.
pub const _SD_BUS_TYPE_INVALID: u8 = 0;
pub const SD_BUS_TYPE_BYTE: u8 = b'y';
pub const SD_BUS_TYPE_BOOLEAN: u8 = b'b';
pub const SD_BUS_TYPE_INT16: u8 = b'n';
pub const SD_BUS_TYPE_UINT16: u8 = b'q';
pub const SD_BUS_TYPE_INT32: u8 = b'i';
pub const SD_BUS_TYPE_UINT32: u8 = b'u';
pub const SD_BUS_TYPE_INT64: u8 = b'x';
pub const SD_BUS_TYPE_UINT64: u8 = b't';
pub const SD_BUS_TYPE_DOUBLE: u8 = b'd';
pub const SD_BUS_TYPE_STRING: u8 = b's';
pub const SD_BUS_TYPE_OBJECT_PATH: u8 = b'o';
pub const SD_BUS_TYPE_SIGNATURE: u8 = b'g';
pub const SD_BUS_TYPE_UNIX_FD: u8 = b'h';
pub const SD_BUS_TYPE_ARRAY: u8 = b'a';
pub const SD_BUS_TYPE_VARIANT: u8 = b'v';
pub const SD_BUS_TYPE_STRUCT: u8 = b'r';
pub const SD_BUS_TYPE_STRUCT_BEGIN: u8 = b'(';
pub const SD_BUS_TYPE_STRUCT_END: u8 = b')';
pub const SD_BUS_TYPE_DICT_ENTRY: u8 = b'e';
pub const SD_BUS_TYPE_DICT_ENTRY_BEGIN: u8 = b'{';
pub const SD_BUS_TYPE_DICT_ENTRY_END: u8 = b'}';
