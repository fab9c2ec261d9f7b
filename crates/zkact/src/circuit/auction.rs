//! Sealed-bid auction settlement: $n$ bids cleared against a common price.

use pasta_curves::{Fp, pallas};
use proof_oracle::{Circuit, Driver, Element, Point, Unsatisfied};
use rand::{CryptoRng, RngCore};

use super::{
    Payee, ShapeError,
    gadgets::{
        CiphertextVars, HandoffVars, NoteVars, check_generator, commit, enforce_generator, nullify,
        push_ciphertext, push_point,
    },
};
use crate::{
    cipher::{Ciphertext, Exchange, Handoff, Payload},
    config::Params,
    note::{Commitment, Note, Nullifier, Public},
};

/// A bid to settle: the note backing it, where its proceeds go, and the
/// bid value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bid {
    /// The note spent by the bidder.
    pub note: Note,
    /// Recipient of the settled note.
    pub payee: Payee,
    /// Bid value $B_i$.
    pub value: u64,
}

/// Public side of one bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BidInstance {
    /// $Sn_{in}$
    pub nullifier: Nullifier,
    /// $Cm_{out}$
    pub commitment: Commitment,
    /// $(C_1, C_2, C_3)$ over $(Sk_{in}, Pk_{out}, B_i)$.
    pub ciphertext: Ciphertext,
    /// $(G_r, G_b)$
    pub handoff: Handoff,
}

/// Public side of an auction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuctionInstance {
    /// Clearing price $p$, matched off-circuit.
    pub price: u64,
    /// Key-agreement generator $G$.
    pub generator: pallas::Affine,
    /// Buyers first, then sellers.
    pub bids: Vec<BidInstance>,
}

/// Secret side of one bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BidWitness {
    /// The spent note. Only $Sk$ and $\rho$ enter the circuit.
    pub input: Note,
    /// The settled note.
    pub output: Note<Public>,
    /// Bid value $B_i$.
    pub value: u64,
    /// Key-agreement exponents $(r, b)$.
    pub exchange: Exchange,
}

/// Proves that $n$ sealed bids clear at price $p$.
///
/// Once per auction it asserts $G$ is not the identity. For every bid $i$,
/// the circuit:
///
/// 1. **Cipher** — $(C_1, C_2, C_3)$ masks $(Sk_{in}, Pk_{out}, B_i)$
/// 2. **Nullifier** — $Sn_{in} = H(Sk_{in}, \rho_{in})$
/// 3. **Clearing** — $B_i \ge p$ for the first $n/2$ bids (buyers),
///    $B_i \le p$ for the rest (sellers), over 64-bit values
/// 4. **Commitment** — $Cm_{out} = H(T_0, T_1, R, \rho, Pk)_{out}$
/// 5. **Key agreement** — $G_r = G^r$, $G_b = G^b$, $G_{rb} = G_r^{\,b}$
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuctionCircuit {
    params: Params,
    instance: AuctionInstance,
    witness: Vec<BidWitness>,
}

impl AuctionCircuit {
    /// Pairs an instance and witness, checking both against `params`.
    pub fn new(
        params: Params,
        instance: AuctionInstance,
        witness: Vec<BidWitness>,
    ) -> Result<Self, ShapeError> {
        params.validate()?;
        check_generator(&instance.generator)?;
        for actual in [instance.bids.len(), witness.len()] {
            if actual != params.auction_size {
                return Err(ShapeError::Bids {
                    expected: params.auction_size,
                    actual,
                });
            }
        }
        Ok(Self {
            params,
            instance,
            witness,
        })
    }

    /// Seals every bid to a fresh key agreement over `generator` and issues its
    /// settled note.
    ///
    /// `bids` lists buyers first. Bids on the wrong side of `price` build
    /// but cannot be proven.
    pub fn build<R: RngCore + CryptoRng>(
        params: Params,
        price: u64,
        bids: &[Bid],
        generator: pallas::Affine,
        rng: &mut R,
    ) -> Result<Self, ShapeError> {
        let (instances, witness) = bids
            .iter()
            .map(|bid| {
                let output = Note::issue(bid.payee.tag, bid.payee.pk, &mut *rng);
                let exchange = Exchange::random(&mut *rng);
                let payload = Payload {
                    sk_in: bid.note.sk,
                    pk_out: bid.payee.pk,
                    value: Fp::from(bid.value),
                };
                let public = BidInstance {
                    nullifier: bid.note.nullifier(),
                    commitment: output.commitment(),
                    ciphertext: Ciphertext::seal(&payload, &exchange.shared(&generator)),
                    handoff: exchange.handoff(&generator),
                };
                let secret = BidWitness {
                    input: bid.note,
                    output,
                    value: bid.value,
                    exchange,
                };
                (public, secret)
            })
            .unzip();

        Self::new(
            params,
            AuctionInstance {
                price,
                generator,
                bids: instances,
            },
            witness,
        )
    }

    /// The parameters this circuit was built for.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Public instance.
    #[must_use]
    pub const fn instance(&self) -> &AuctionInstance {
        &self.instance
    }

    /// Secret witness, one entry per bid.
    #[must_use]
    pub fn witness(&self) -> &[BidWitness] {
        &self.witness
    }
}

impl Circuit for AuctionCircuit {
    const NAME: &'static str = "zkact.auction";

    /// $(p, G.x, G.y)$ followed, per bid, by
    /// $(Sn, Cm, C_1, C_2, C_3, G_r.x, G_r.y, G_b.x, G_b.y)$.
    fn public_inputs(&self) -> Vec<Fp> {
        let instance = &self.instance;
        let mut inputs = vec![Fp::from(instance.price)];
        push_point(&mut inputs, &instance.generator);
        for bid in &instance.bids {
            inputs.push(bid.nullifier.into());
            inputs.push(bid.commitment.into());
            push_ciphertext(&mut inputs, &bid.ciphertext);
            push_point(&mut inputs, &bid.handoff.g_r);
            push_point(&mut inputs, &bid.handoff.g_b);
        }
        inputs
    }

    fn synthesize<D: Driver>(&self, dr: &mut D) -> Result<(), Unsatisfied> {
        let instance = &self.instance;
        let buyers = self.params.buyers();

        let price = Element::public(dr, Fp::from(instance.price));
        let generator = Point::public(dr, instance.generator);
        enforce_generator(dr, &generator)?;

        for (index, (public, bid)) in instance.bids.iter().zip(&self.witness).enumerate() {
            // ── Public inputs ───────────────────────────────────────
            let nullifier = Element::public(dr, public.nullifier.into());
            let commitment = Element::public(dr, public.commitment.into());
            let ciphertext = CiphertextVars::public(dr, &public.ciphertext);
            let handoff = HandoffVars::public(dr, &public.handoff);

            // ── Witness ─────────────────────────────────────────────
            let sk = Element::alloc(dr, bid.input.sk.into());
            let rho = Element::alloc(dr, bid.input.rho.into());
            let output = NoteVars::alloc(dr, &bid.output);
            let value = Element::alloc(dr, Fp::from(bid.value));
            let sender = Element::alloc(dr, bid.exchange.sender.into());
            let recipient = Element::alloc(dr, bid.exchange.recipient.into());
            let shared = Point::alloc(dr, bid.exchange.shared(&instance.generator).point());

            // ── Checks ──────────────────────────────────────────────
            ciphertext.enforce_payload(dr, &shared, [&sk, &output.pk, &value])?;
            nullify(dr, &sk, &rho).enforce_equal(dr, &nullifier, "auction.nullifier")?;
            if index < buyers {
                price.enforce_leq(dr, &value, "auction.buyer")?;
            } else {
                value.enforce_leq(dr, &price, "auction.seller")?;
            }
            commit(dr, &output).enforce_equal(dr, &commitment, "auction.cm")?;
            handoff.enforce_exchange(dr, &generator, &sender, &recipient, &shared)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use group::prime::PrimeCurveAffine as _;
    use proof_oracle::{OracleError, prove, setup, verify};
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;
    use crate::{
        keys::SecretKey,
        note::{Rho, Tag, Trapdoor},
    };

    fn sample_bids(rng: &mut StdRng, values: &[u64]) -> Vec<Bid> {
        values
            .iter()
            .map(|value| Bid {
                note: Note::mint(Tag::new(1, 1), SecretKey::random(&mut *rng), &mut *rng),
                payee: Payee {
                    tag: Tag::new(0, *value),
                    pk: SecretKey::random(&mut *rng).public_key(),
                },
                value: *value,
            })
            .collect()
    }

    fn auction(seed: u64, price: u64, values: &[u64]) -> AuctionCircuit {
        let mut rng = StdRng::seed_from_u64(seed);
        let params = Params::new(1, 1, values.len()).unwrap();
        let bids = sample_bids(&mut rng, values);
        AuctionCircuit::build(params, price, &bids, pallas::Affine::generator(), &mut rng).unwrap()
    }

    #[test]
    fn clearing_auction_proves_and_verifies() {
        let circuit = auction(0, 50, &[60, 50, 50, 10]);
        let (pk, vk) = setup(&circuit).unwrap();
        let proof = prove(&circuit, &pk).unwrap();
        assert!(verify(&proof, &vk, &circuit.public_inputs()));
    }

    #[test]
    fn low_buyer_is_rejected() {
        let circuit = auction(1, 50, &[60, 49, 40, 10]);
        let (pk, _vk) = setup(&circuit).unwrap();
        assert_eq!(
            prove(&circuit, &pk).unwrap_err(),
            OracleError::Unsatisfied(Unsatisfied {
                label: "auction.buyer"
            })
        );
    }

    #[test]
    fn high_seller_is_rejected() {
        let circuit = auction(2, 50, &[60, 70, 40, 51]);
        let (pk, _vk) = setup(&circuit).unwrap();
        assert_eq!(
            prove(&circuit, &pk).unwrap_err(),
            OracleError::Unsatisfied(Unsatisfied {
                label: "auction.seller"
            })
        );
    }

    /// The price is a public input: a proof for one price does not verify
    /// under another.
    #[test]
    fn price_is_bound_by_the_proof() {
        let circuit = auction(3, 50, &[60, 10]);
        let (pk, vk) = setup(&circuit).unwrap();
        let proof = prove(&circuit, &pk).unwrap();

        let mut repriced = circuit.clone();
        repriced.instance.price = 55;
        assert!(!verify(&proof, &vk, &repriced.public_inputs()));
        assert!(prove(&repriced, &pk).is_ok());
    }

    #[test]
    fn misdirected_output_is_rejected() {
        let mut circuit = auction(4, 50, &[60, 10]);
        let (pk, _vk) = setup(&circuit).unwrap();
        if let Some(bid) = circuit.witness.get_mut(0) {
            bid.output.pk = SecretKey::from(Fp::from(3u64)).public_key();
        }
        assert_eq!(
            prove(&circuit, &pk).unwrap_err(),
            OracleError::Unsatisfied(Unsatisfied { label: "cipher.c2" })
        );
    }

    fn assert_rejected(circuit: &AuctionCircuit, label: &'static str) {
        let (pk, _vk) = setup(circuit).unwrap();
        assert_eq!(
            prove(circuit, &pk).unwrap_err(),
            OracleError::Unsatisfied(Unsatisfied { label })
        );
    }

    #[test]
    fn spent_serial_is_bound() {
        let circuit = auction(6, 50, &[60, 10]);

        let mut forged = circuit.clone();
        if let Some(bid) = forged.witness.get_mut(1) {
            bid.input.rho = Rho::from(Fp::from(4u64));
        }
        assert_rejected(&forged, "auction.nullifier");

        let mut forged = circuit;
        if let Some(bid) = forged.instance.bids.get_mut(0) {
            bid.nullifier = Nullifier::from(Fp::ONE);
        }
        assert_rejected(&forged, "auction.nullifier");
    }

    #[test]
    fn settled_commitment_is_bound() {
        let circuit = auction(7, 50, &[60, 10]);

        let mut forged = circuit.clone();
        if let Some(bid) = forged.witness.get_mut(0) {
            bid.output.rcm = Trapdoor::from(Fp::from(9u64));
        }
        assert_rejected(&forged, "auction.cm");

        let mut forged = circuit.clone();
        if let Some(bid) = forged.instance.bids.get_mut(1) {
            bid.commitment = Commitment::from(Fp::ONE);
        }
        assert_rejected(&forged, "auction.cm");

        let mut forged = circuit;
        if let Some(bid) = forged.instance.bids.get_mut(1) {
            bid.handoff.g_r = pallas::Affine::generator();
        }
        assert_rejected(&forged, "dh.g_r");
    }

    #[test]
    fn identity_generator_is_rejected() {
        let mut rng = StdRng::seed_from_u64(8);
        let bids = sample_bids(&mut rng, &[60, 10]);
        let params = Params::new(1, 1, 2).unwrap();
        assert_eq!(
            AuctionCircuit::build(params, 50, &bids, pallas::Affine::identity(), &mut rng)
                .unwrap_err(),
            ShapeError::IdentityGenerator
        );

        let mut forged = auction(8, 50, &[60, 10]);
        forged.instance.generator = pallas::Affine::identity();
        assert_rejected(&forged, "dh.generator");
    }

    #[test]
    fn bid_count_is_checked() {
        let circuit = auction(5, 50, &[60, 10]);
        let params = Params::new(1, 1, 4).unwrap();
        assert_eq!(
            AuctionCircuit::new(params, circuit.instance, circuit.witness).unwrap_err(),
            ShapeError::Bids {
                expected: 4,
                actual: 2
            }
        );
    }
}
