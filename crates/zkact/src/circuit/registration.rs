//! Registration: hands the re-spend authorization of an existing note to a
//! recipient.

use pasta_curves::{Fp, pallas};
use proof_oracle::{Circuit, Driver, Element, Point, Unsatisfied};
use rand::{CryptoRng, RngCore};

use super::{
    ShapeError,
    gadgets::{
        CiphertextVars, HandoffVars, NoteVars, check_generator, commit, enforce_generator, key_gen,
        push_ciphertext, push_point,
    },
};
use crate::{
    cipher::{Ciphertext, Exchange, Handoff, Payload},
    keys::PublicKey,
    note::{Commitment, Note},
};

/// Public side of a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationInstance {
    /// $Cm_{in}$ of the registered note.
    pub commitment: Commitment,
    /// $(C_1, C_2, C_3)$ over $(Sk_{in}, Pk_{out}, B)$.
    pub ciphertext: Ciphertext,
    /// Key-agreement generator $G$.
    pub generator: pallas::Affine,
    /// $(G_r, G_b)$
    pub handoff: Handoff,
}

/// Secret side of a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationWitness {
    /// The registered note, with its secret key.
    pub note: Note,
    /// Recipient public key $Pk_{out}$.
    pub pk_out: PublicKey,
    /// Handed-off value $B$.
    pub value: u64,
    /// Key-agreement exponents $(r, b)$.
    pub exchange: Exchange,
}

/// Proves that a public ciphertext hands off the secret key of a committed
/// note.
///
/// Given a [`RegistrationWitness`], the circuit:
///
/// 0. **Generator** — $G$ is not the identity
/// 1. **Key consistency** — $Pk_{in} = H(Sk_{in})$
/// 2. **Commitment** — $Cm_{in} = H(T_0, T_1, R, \rho, Pk_{in})$
/// 3. **Range** — $0 \le B < 2^{64}$
/// 4. **Cipher** — $(C_1, C_2, C_3)$ masks $(Sk_{in}, Pk_{out}, B)$ under
///    $G_{rb}$
/// 5. **Key agreement** — $G_r = G^r$, $G_b = G^b$, $G_{rb} = G_r^{\,b}$
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationCircuit {
    /// Public instance.
    pub instance: RegistrationInstance,
    /// Secret witness.
    pub witness: RegistrationWitness,
}

impl RegistrationCircuit {
    /// Seals `note`'s secret key, `pk_out` and `value` to a fresh key
    /// agreement over `generator`.
    pub fn build<R: RngCore + CryptoRng>(
        note: Note,
        pk_out: PublicKey,
        value: u64,
        generator: pallas::Affine,
        rng: &mut R,
    ) -> Result<Self, ShapeError> {
        check_generator(&generator)?;
        let exchange = Exchange::random(rng);
        let payload = Payload {
            sk_in: note.sk,
            pk_out,
            value: Fp::from(value),
        };
        Ok(Self {
            instance: RegistrationInstance {
                commitment: note.commitment(),
                ciphertext: Ciphertext::seal(&payload, &exchange.shared(&generator)),
                generator,
                handoff: exchange.handoff(&generator),
            },
            witness: RegistrationWitness {
                note,
                pk_out,
                value,
                exchange,
            },
        })
    }
}

impl Circuit for RegistrationCircuit {
    const NAME: &'static str = "zkact.registration";

    /// $(Cm_{in}, C_1, C_2, C_3, G.x, G.y, G_r.x, G_r.y, G_b.x, G_b.y)$
    fn public_inputs(&self) -> Vec<Fp> {
        let instance = &self.instance;
        let mut inputs = vec![instance.commitment.into()];
        push_ciphertext(&mut inputs, &instance.ciphertext);
        push_point(&mut inputs, &instance.generator);
        push_point(&mut inputs, &instance.handoff.g_r);
        push_point(&mut inputs, &instance.handoff.g_b);
        inputs
    }

    fn synthesize<D: Driver>(&self, dr: &mut D) -> Result<(), Unsatisfied> {
        let instance = &self.instance;
        let witness = &self.witness;

        // ── Public inputs ───────────────────────────────────────────
        let cm = Element::public(dr, instance.commitment.into());
        let ciphertext = CiphertextVars::public(dr, &instance.ciphertext);
        let generator = Point::public(dr, instance.generator);
        let handoff = HandoffVars::public(dr, &instance.handoff);

        // ── Witness ─────────────────────────────────────────────────
        let note = NoteVars::alloc(dr, &witness.note);
        let sk = Element::alloc(dr, witness.note.sk.into());
        let pk_out = Element::alloc(dr, witness.pk_out.into());
        let value = Element::alloc(dr, Fp::from(witness.value));
        let sender = Element::alloc(dr, witness.exchange.sender.into());
        let recipient = Element::alloc(dr, witness.exchange.recipient.into());
        let shared = Point::alloc(dr, witness.exchange.shared(&instance.generator).point());

        // ── Checks ──────────────────────────────────────────────────
        enforce_generator(dr, &generator)?;
        key_gen(dr, &sk).enforce_equal(dr, &note.pk, "registration.pk")?;
        commit(dr, &note).enforce_equal(dr, &cm, "registration.cm")?;
        value.enforce_range(dr, "registration.value")?;
        ciphertext.enforce_payload(dr, &shared, [&sk, &pk_out, &value])?;
        handoff.enforce_exchange(dr, &generator, &sender, &recipient, &shared)
    }
}
