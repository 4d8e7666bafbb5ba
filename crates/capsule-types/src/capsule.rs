use rug::Integer;

use crate::CapsuleError;

/// A sealed time capsule: the three public puzzle parameters.
///
/// `ciphertext` is the secret XORed with w = 2^(2^`squarings`) mod `modulus`.
/// Whoever performs the squarings recovers the secret; nothing else in the
/// record helps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capsule {
    modulus: Integer,    // n - the RSA modulus (p × q)
    squarings: Integer,  // t - number of sequential squarings
    ciphertext: Integer, // z - secret XOR locked value
}

impl Capsule {
    pub fn new(modulus: Integer, squarings: Integer, ciphertext: Integer) -> Self {
        Capsule {
            modulus,
            squarings,
            ciphertext,
        }
    }

    pub fn modulus(&self) -> &Integer {
        &self.modulus
    }

    pub fn squarings(&self) -> &Integer {
        &self.squarings
    }

    pub fn ciphertext(&self) -> &Integer {
        &self.ciphertext
    }

    /// Checks the record is well-formed before any solving work starts.
    pub fn validate(&self) -> Result<(), CapsuleError> {
        if self.modulus < 2 {
            return Err(CapsuleError::InvalidRecord(
                "n must be greater than 1".into(),
            ));
        }
        if self.squarings.cmp0() == std::cmp::Ordering::Less {
            return Err(CapsuleError::InvalidRecord("t must not be negative".into()));
        }
        if self.ciphertext.cmp0() == std::cmp::Ordering::Less {
            return Err(CapsuleError::InvalidRecord("z must not be negative".into()));
        }
        Ok(())
    }

    /// Renders the record in the interchange text form.
    ///
    /// The layout, the field names and the instruction block are a
    /// compatibility surface shared with independently written solvers;
    /// the constants named in the instructions (base 5, 2^1024) are part
    /// of that surface and stay literal.
    pub fn to_record_text(&self) -> String {
        format!(
            "Crypto-Time-Capsule\n\
             \n\
             Puzzle parameters (all in decimal):\n\
             \n\
             n = {}\n\
             t = {}\n\
             z = {}\n\
             \n\
             To solve the puzzle, first compute w = 2^(2^t) (mod n).\n\
             Then exclusive-or the result with z.\n\
             (Right-justify the two strings first.)\n\
             \n\
             The result is the secret message (8 bits per character),\n\
             including information that will allow you to factor n.\n\
             (The extra information is a seed value b, such that\n\
             5^b (mod 2^1024) is just below a prime factor of n.)\n",
            self.modulus, self.squarings, self.ciphertext
        )
    }

    /// Parses a record from its text form.
    ///
    /// Accepts any text carrying the three `n = ` / `t = ` / `z = ` decimal
    /// fields, so records that gained surrounding prose still load. The
    /// parsed record is validated before being returned.
    pub fn parse_record(text: &str) -> Result<Self, CapsuleError> {
        let mut modulus = None;
        let mut squarings = None;
        let mut ciphertext = None;

        for line in text.lines() {
            let line = line.trim();
            if let Some(value) = line.strip_prefix("n = ") {
                modulus = Some(parse_decimal("n", value)?);
            } else if let Some(value) = line.strip_prefix("t = ") {
                squarings = Some(parse_decimal("t", value)?);
            } else if let Some(value) = line.strip_prefix("z = ") {
                ciphertext = Some(parse_decimal("z", value)?);
            }
        }

        let capsule = Capsule {
            modulus: modulus
                .ok_or_else(|| CapsuleError::InvalidRecord("missing field: n".into()))?,
            squarings: squarings
                .ok_or_else(|| CapsuleError::InvalidRecord("missing field: t".into()))?,
            ciphertext: ciphertext
                .ok_or_else(|| CapsuleError::InvalidRecord("missing field: z".into()))?,
        };
        capsule.validate()?;
        Ok(capsule)
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<Integer, CapsuleError> {
    Integer::parse(value.trim())
        .map(Integer::from)
        .map_err(|e| CapsuleError::InvalidRecord(format!("field {field}: {e}")))
}
