use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use bincode::Options;

use crate::error::Result;

fn options() -> impl Options {
    // Dictionaries of tens of thousands of words exceed the default limit
    bincode::DefaultOptions::new().with_no_limit()
}

pub fn save_to_disk<T: Serialize, TPath: AsRef<Path>>(data: &T, path: TPath) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    options().serialize_into(writer, data)?;
    Ok(())
}

pub fn load_from_disk<T: DeserializeOwned, TPath: AsRef<Path>>(path: TPath) -> Result<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(options().deserialize_from(reader)?)
}
