use serde::Serialize;

/// Discord "blurple" brand colour.
pub const BLURPLE: u32 = 0x5865F2;

/// Chat embed ready to be posted by the bot.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Embed {
    /// Heading line.
    pub title: String,
    /// Side bar colour as `0xRRGGBB`.
    pub color: u32,
    /// Blocks in display order.
    pub fields: Vec<EmbedField>,
}

/// A single name/value block of an [`Embed`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmbedField {
    /// Block heading.
    pub name: String,
    /// Block body.
    pub value: String,
    /// Whether the block may share a row with its neighbours.
    pub inline: bool,
}

impl Embed {
    /// Empty embed.
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            color,
            fields: Vec::new(),
        }
    }

    /// Append a block.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}
