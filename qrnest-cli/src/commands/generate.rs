//! Composite QR generation pipeline.

use anyhow::{Context, Result};
use qrnest_lib::cipher::MessageCipher;
use qrnest_lib::symbol::{self, EcLevel, SymbolSpec};
use qrnest_lib::{compose, keys};

/// Output artifact, written to the current working directory and
/// overwritten unconditionally.
const OUTPUT_FILE: &str = "complex_qr_code.png";

/// Primary symbol: the URL, dense and forgiving enough to stay scannable
/// under the overlays.
const PRIMARY: SymbolSpec = SymbolSpec::new(10, EcLevel::M, 10);

/// Secondary symbol: the encrypted message token.
const SECONDARY: SymbolSpec = SymbolSpec::new(5, EcLevel::H, 6);

/// Tertiary symbol: the raw key string.
const TERTIARY: SymbolSpec = SymbolSpec::new(2, EcLevel::H, 4);

/// Run the four-stage pipeline and write the composite PNG.
pub fn run(url: &str, key: &str, message: &str) -> Result<()> {
    let encoded_key = keys::encoded_key(key);
    let cipher = MessageCipher::new(&encoded_key).context("Cipher initialization failed")?;
    let token = cipher
        .encrypt(message)
        .context("Message encryption failed")?;

    let primary = symbol::render(url, &PRIMARY).context("Primary QR synthesis failed")?;
    let secondary = symbol::render(&token, &SECONDARY).context("Secondary QR synthesis failed")?;
    let tertiary = symbol::render(key, &TERTIARY).context("Tertiary QR synthesis failed")?;

    let composite = compose::compose(primary, &secondary, &tertiary);
    composite
        .save(OUTPUT_FILE)
        .with_context(|| format!("Failed to write '{}'", OUTPUT_FILE))?;

    println!(
        "Complex QR code generated and saved as '{}'.",
        OUTPUT_FILE
    );
    Ok(())
}
