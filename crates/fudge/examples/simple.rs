//! Builds a small message, encodes it, and reads it back.
//!
//! Run with `cargo run --example simple`.

use fudge::{Envelope, FudgeError, Message};

fn main() -> Result<(), FudgeError> {
    let mut address = Message::new();
    address.add_string(None, Some(0), "123 Fake Street")?;
    address.add_string(None, Some(1), "Some City")?;
    address.add_string(None, Some(2), "P0S T4L")?;
    address.add_string(None, Some(3), "Country")?;

    let mut person = Message::new();
    person.add_string(Some("name"), None, "Random Person")?;
    person.add_i64(Some("dob"), None, 19801231)?;
    person.add_message(Some("address"), None, address)?;

    let bytes = fudge::encode_envelope(&Envelope::new(person))?;
    println!("encoded {} bytes", bytes.len());

    let decoded = fudge::decode_envelope(&bytes)?;
    let message = decoded.message();

    println!(
        "name: {}",
        message.field_by_name("name")?.string().unwrap_or("?")
    );
    // added as an i64 but narrowed to an int on the wire
    println!("dob:  {}", message.field_by_name("dob")?.as_i64()?);

    let address = message.field_by_name("address")?.message().unwrap();
    for field in address.fields() {
        println!(
            "address[{}]: {}",
            field.ordinal().unwrap_or(0),
            field.string().unwrap_or("?")
        );
    }
    Ok(())
}
