use std::io::Write;

use auto_impl::auto_impl;

use crate::quality::phred_score;
use crate::Result;

/// A FASTQ read as seen by the codec
///
/// The identifier is the header line without its leading `@`. Sequence and quality are the
/// raw text lines; quality characters are Phred+33.
#[auto_impl(&, &mut, Box)]
pub trait FastqRead {
    /// Returns the identifier of this read
    fn id(&self) -> &[u8];

    /// Returns the nucleotide sequence of this read
    fn seq(&self) -> &[u8];

    /// Returns the Phred+33 quality string of this read
    fn qual(&self) -> &[u8];

    /// Returns the number of bases in this read
    fn len(&self) -> usize {
        self.seq().len()
    }

    /// A convenience function to check if the read has no bases
    fn is_empty(&self) -> bool {
        self.seq().is_empty()
    }
}

/// A read borrowing its fields from somewhere else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefRead<'a> {
    pub id: &'a [u8],
    pub seq: &'a [u8],
    pub qual: &'a [u8],
}
impl<'a> RefRead<'a> {
    #[must_use]
    pub fn new(id: &'a [u8], seq: &'a [u8], qual: &'a [u8]) -> Self {
        Self { id, seq, qual }
    }

    #[must_use]
    pub fn to_owned_read(&self) -> Read {
        Read::new(self.id.to_vec(), self.seq.to_vec(), self.qual.to_vec())
    }
}
impl FastqRead for RefRead<'_> {
    fn id(&self) -> &[u8] {
        self.id
    }
    fn seq(&self) -> &[u8] {
        self.seq
    }
    fn qual(&self) -> &[u8] {
        self.qual
    }
}

/// An owned read, as produced by the decoder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Read {
    pub id: Vec<u8>,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}
impl Read {
    #[must_use]
    pub fn new(id: Vec<u8>, seq: Vec<u8>, qual: Vec<u8>) -> Self {
        Self { id, seq, qual }
    }

    #[must_use]
    pub fn as_ref_read(&self) -> RefRead<'_> {
        RefRead::new(&self.id, &self.seq, &self.qual)
    }

    /// Integer Phred scores of the quality string
    pub fn scores(&self) -> impl Iterator<Item = i16> + '_ {
        self.qual.iter().map(|&q| phred_score(q))
    }

    /// Clears all fields, keeping their allocations
    pub fn clear(&mut self) {
        self.id.clear();
        self.seq.clear();
        self.qual.clear();
    }

    /// Writes the read as a four-line FASTQ record
    pub fn write_fastq<W: Write>(&self, writer: W) -> Result<()> {
        seq_io::fastq::write_to(writer, &self.id, &self.seq, &self.qual)?;
        Ok(())
    }
}
impl FastqRead for Read {
    fn id(&self) -> &[u8] {
        &self.id
    }
    fn seq(&self) -> &[u8] {
        &self.seq
    }
    fn qual(&self) -> &[u8] {
        &self.qual
    }
}

impl FastqRead for seq_io::fastq::RefRecord<'_> {
    fn id(&self) -> &[u8] {
        seq_io::fastq::Record::head(self)
    }
    fn seq(&self) -> &[u8] {
        seq_io::fastq::Record::seq(self)
    }
    fn qual(&self) -> &[u8] {
        seq_io::fastq::Record::qual(self)
    }
}

impl FastqRead for seq_io::fastq::OwnedRecord {
    fn id(&self) -> &[u8] {
        seq_io::fastq::Record::head(self)
    }
    fn seq(&self) -> &[u8] {
        seq_io::fastq::Record::seq(self)
    }
    fn qual(&self) -> &[u8] {
        seq_io::fastq::Record::qual(self)
    }
}
