//! Batched transfer: $l$ notes spent under a common root, $l$ notes created.

use core::iter;

use ff::Field as _;
use pasta_curves::{Fp, pallas};
use proof_oracle::{Circuit, Driver, Element, Hasher, Point, Sponge, Unsatisfied};
use rand::{CryptoRng, RngCore};

use super::{
    Payee, ShapeError,
    gadgets::{
        CiphertextVars, HandoffVars, NoteVars, check_generator, commit, enforce_generator,
        key_gen, merkle_root, nullify, push_ciphertext, push_point,
    },
};
use crate::{
    cipher::{Ciphertext, Exchange, Handoff, Payload},
    config::Params,
    merkle::{MerklePath, MerkleTree},
    note::{Commitment, Note, Nullifier, Public, Rho, Trapdoor},
};

/// Serials for the notes created by a batch.
///
/// $$s = H(Sn_0, \ldots, Sn_{l-1}) \qquad \rho_0 = H(s) \qquad
///   \rho_{j+1} = H(\rho_j)$$
///
/// Distinct batches spend distinct nullifiers, so their created notes never
/// share a serial.
#[must_use]
pub fn derive_rhos(nullifiers: &[Nullifier]) -> Vec<Rho> {
    let seed = Hasher::hash(&nullifiers.iter().copied().map(Fp::from).collect::<Vec<_>>());
    iter::successors(Some(Hasher::hash(&[seed])), |rho| Some(Hasher::hash(&[*rho])))
        .take(nullifiers.len())
        .map(Rho::from)
        .collect()
}

/// Public side of one transfer leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegInstance {
    /// $Sn_{old}$
    pub nullifier: Nullifier,
    /// $Cm_{new}$
    pub commitment: Commitment,
    /// $(C_1, C_2, C_3)$ over $(Sk_{old}, Pk_{new}, T_1^{new})$.
    pub ciphertext: Ciphertext,
    /// $(G_r, G_b)$
    pub handoff: Handoff,
}

/// Public side of a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferInstance {
    /// Commitment tree root $Rt$.
    pub root: Fp,
    /// Key-agreement generator $G$.
    pub generator: pallas::Affine,
    /// One entry per leg.
    pub legs: Vec<LegInstance>,
}

/// Secret side of one transfer leg.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegWitness {
    /// The spent note.
    pub old: Note,
    /// Membership path of the spent note's commitment.
    pub path: MerklePath,
    /// The created note.
    pub new: Note<Public>,
    /// Key-agreement exponents $(r, b)$.
    pub exchange: Exchange,
}

/// Proves a batch of $l$ spends and $l$ creations conserving value.
///
/// Once per batch it asserts $G$ is not the identity. For every leg $j$,
/// the circuit:
///
/// 1. **Key consistency** — $Pk_{old} = H(Sk_{old})$
/// 2. **Nullifier** — $Sn_{old} = H(Sk_{old}, \rho_{old})$
/// 3. **Membership** — $Cm_{old}$ lies under $Rt$ along the witnessed path
/// 4. **Freshness** — $\rho_{new}$ is the $j$-th serial of [`derive_rhos`]
/// 5. **Commitment** — $Cm_{new} = H(T_0, T_1, R, \rho, Pk)_{new}$
/// 6. **Range** — both amounts fit in 64 bits
/// 7. **Cipher** — $(C_1, C_2, C_3)$ masks $(Sk_{old}, Pk_{new}, T_1^{new})$
/// 8. **Key agreement** — $G_r = G^r$, $G_b = G^b$, $G_{rb} = G_r^{\,b}$
///
/// and across the batch:
///
/// $$\sum_j T_1^{old,j} = \sum_j T_1^{new,j}$$
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferCircuit {
    params: Params,
    instance: TransferInstance,
    witness: Vec<LegWitness>,
}

impl TransferCircuit {
    /// Pairs an instance and witness, checking both against `params`.
    pub fn new(
        params: Params,
        instance: TransferInstance,
        witness: Vec<LegWitness>,
    ) -> Result<Self, ShapeError> {
        params.validate()?;
        check_generator(&instance.generator)?;
        for actual in [instance.legs.len(), witness.len()] {
            if actual != params.batch_size {
                return Err(ShapeError::Legs {
                    expected: params.batch_size,
                    actual,
                });
            }
        }
        if let Some(path) = witness
            .iter()
            .map(|leg| &leg.path)
            .find(|path| path.depth() != params.tree_depth)
        {
            return Err(ShapeError::PathDepth {
                expected: params.tree_depth,
                actual: path.depth(),
            });
        }
        Ok(Self {
            params,
            instance,
            witness,
        })
    }

    /// Spends the notes of `tree` at the given positions and pays `payees`.
    ///
    /// Created serials follow [`derive_rhos`]; trapdoors and key-agreement
    /// exponents are drawn from `rng`. Value conservation is not checked
    /// here: an unbalanced batch builds but cannot be proven.
    pub fn build<R: RngCore + CryptoRng>(
        params: Params,
        tree: &MerkleTree,
        spends: &[(Note, u64)],
        payees: &[Payee],
        generator: pallas::Affine,
        rng: &mut R,
    ) -> Result<Self, ShapeError> {
        params.validate()?;
        if payees.len() != spends.len() {
            return Err(ShapeError::Legs {
                expected: spends.len(),
                actual: payees.len(),
            });
        }

        let nullifiers: Vec<Nullifier> = spends.iter().map(|&(old, _)| old.nullifier()).collect();
        let rhos = derive_rhos(&nullifiers);

        let mut legs = Vec::with_capacity(spends.len());
        let mut witness = Vec::with_capacity(spends.len());
        for (((&(old, position), payee), nullifier), rho) in
            spends.iter().zip(payees).zip(nullifiers).zip(rhos)
        {
            let new = Note {
                tag: payee.tag,
                pk: payee.pk,
                sk: (),
                rho,
                rcm: Trapdoor::from(Fp::random(&mut *rng)),
            };
            let exchange = Exchange::random(&mut *rng);
            let payload = Payload {
                sk_in: old.sk,
                pk_out: payee.pk,
                value: payee.tag.amount,
            };
            legs.push(LegInstance {
                nullifier,
                commitment: new.commitment(),
                ciphertext: Ciphertext::seal(&payload, &exchange.shared(&generator)),
                handoff: exchange.handoff(&generator),
            });
            witness.push(LegWitness {
                old,
                path: tree.witness(position)?,
                new,
                exchange,
            });
        }

        Self::new(
            params,
            TransferInstance {
                root: tree.root(),
                generator,
                legs,
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
    pub const fn instance(&self) -> &TransferInstance {
        &self.instance
    }

    /// Secret witness, one entry per leg.
    #[must_use]
    pub fn witness(&self) -> &[LegWitness] {
        &self.witness
    }
}

/// Allocated public side of one leg.
struct LegVars {
    nullifier: Element,
    commitment: Element,
    ciphertext: CiphertextVars,
    handoff: HandoffVars,
}

impl Circuit for TransferCircuit {
    const NAME: &'static str = "zkact.transfer";

    /// $(Rt, G.x, G.y)$ followed, per leg, by
    /// $(Sn, Cm, C_1, C_2, C_3, G_r.x, G_r.y, G_b.x, G_b.y)$.
    fn public_inputs(&self) -> Vec<Fp> {
        let instance = &self.instance;
        let mut inputs = vec![instance.root];
        push_point(&mut inputs, &instance.generator);
        for leg in &instance.legs {
            inputs.push(leg.nullifier.into());
            inputs.push(leg.commitment.into());
            push_ciphertext(&mut inputs, &leg.ciphertext);
            push_point(&mut inputs, &leg.handoff.g_r);
            push_point(&mut inputs, &leg.handoff.g_b);
        }
        inputs
    }

    fn synthesize<D: Driver>(&self, dr: &mut D) -> Result<(), Unsatisfied> {
        let instance = &self.instance;

        // ── Public inputs ───────────────────────────────────────────
        let root = Element::public(dr, instance.root);
        let generator = Point::public(dr, instance.generator);
        let public: Vec<LegVars> = instance
            .legs
            .iter()
            .map(|leg| LegVars {
                nullifier: Element::public(dr, leg.nullifier.into()),
                commitment: Element::public(dr, leg.commitment.into()),
                ciphertext: CiphertextVars::public(dr, &leg.ciphertext),
                handoff: HandoffVars::public(dr, &leg.handoff),
            })
            .collect();

        enforce_generator(dr, &generator)?;

        // ── Serial chain seed ───────────────────────────────────────
        let nullifiers: Vec<&Element> = public.iter().map(|leg| &leg.nullifier).collect();
        let mut rho = Sponge::hash(dr, &nullifiers);

        let zero = Element::constant(dr, Fp::ZERO);
        let mut spent = zero;
        let mut created = zero;

        for (vars, leg) in public.iter().zip(&self.witness) {
            // ── Witness ─────────────────────────────────────────────
            let sk = Element::alloc(dr, leg.old.sk.into());
            let old = NoteVars::alloc(dr, &leg.old);
            let new = NoteVars::alloc(dr, &leg.new);
            let sender = Element::alloc(dr, leg.exchange.sender.into());
            let recipient = Element::alloc(dr, leg.exchange.recipient.into());
            let shared = Point::alloc(dr, leg.exchange.shared(&instance.generator).point());

            // ── Spend ───────────────────────────────────────────────
            key_gen(dr, &sk).enforce_equal(dr, &old.pk, "transfer.pk")?;
            nullify(dr, &sk, &old.rho).enforce_equal(dr, &vars.nullifier, "transfer.nullifier")?;
            let leaf = commit(dr, &old);
            merkle_root(dr, &leaf, &leg.path).enforce_equal(dr, &root, "merkle.root")?;

            // ── Create ──────────────────────────────────────────────
            rho = Sponge::hash(dr, &[&rho]);
            new.rho.enforce_equal(dr, &rho, "transfer.rho")?;
            commit(dr, &new).enforce_equal(dr, &vars.commitment, "transfer.cm")?;

            // ── Hand off ────────────────────────────────────────────
            vars.ciphertext
                .enforce_payload(dr, &shared, [&sk, &new.pk, &new.amount])?;
            vars.handoff.enforce_exchange(dr, &generator, &sender, &recipient, &shared)?;

            // ── Value ───────────────────────────────────────────────
            old.amount.enforce_range(dr, "transfer.amount")?;
            new.amount.enforce_range(dr, "transfer.amount")?;
            spent = spent.add(dr, &old.amount);
            created = created.add(dr, &new.amount);
        }

        spent.enforce_equal(dr, &created, "transfer.balance")
    }
}
