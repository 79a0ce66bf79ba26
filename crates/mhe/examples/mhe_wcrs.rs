// Multiparty BFV without a common reference string: every participant keys
// itself with its own random polynomial, and ciphertexts are bundled into
// extended ciphertexts with one slot per participant.

mod util;

use std::{env, error::Error, process::exit};

use console::style;
use mhe::{
    bfv::{Computer, Encoding},
    extended::ExtendedCiphertext,
    mbfv::{Aggregate, CommonReferenceString, DecryptionShare, KeyGenRound},
    participant::Participant,
};
use mhe_traits::FheDecoder;
use rand::thread_rng;
use rayon::prelude::*;
use tracing::info;
use util::timeit::timeit;

fn print_notice_and_exit(error: Option<String>) {
    println!(
        "{} Multiparty BFV without a common reference string",
        style("  overview:").magenta().bold()
    );
    println!(
        "{} mhe_wcrs [-h] [--help] [--num_parties=<value>]",
        style("     usage:").magenta().bold()
    );
    println!(
        "{} {} must be at least 3",
        style("constraints:").magenta().bold(),
        style("num_parties").blue(),
    );
    if let Some(error) = error {
        println!("{} {}", style("     error:").red().bold(), error);
    }
    exit(0);
}

fn main() -> Result<(), Box<dyn Error>> {
    util::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.contains(&"-h".to_string()) || args.contains(&"--help".to_string()) {
        print_notice_and_exit(None)
    }

    let mut num_parties = 100;
    for arg in &args {
        match util::parse_flag(arg, "--num_parties") {
            Some(Ok(value)) => num_parties = value,
            Some(Err(e)) => print_notice_and_exit(Some(e)),
            None => print_notice_and_exit(Some(format!("Unrecognized argument: {arg}"))),
        }
    }
    if num_parties < 3 {
        print_notice_and_exit(Some("At least 3 parties are required".to_string()))
    }

    println!("# Multiparty BFV without a common reference string");
    println!("\tnum_parties = {num_parties}");

    let params = timeit!("Parameters generation", util::demo_parameters()?);

    let parties = timeit!(
        "Secret key generation",
        (0..num_parties)
            .into_par_iter()
            .map(|i| Participant::new(i, &params, &mut thread_rng()))
            .collect::<Result<Vec<_>, _>>()?
    );

    // Each participant runs key generation alone, against its own CRP.
    let pks = timeit!(
        "Public key generation",
        parties
            .par_iter()
            .map(|p| {
                let mut rng = thread_rng();
                let crs = CommonReferenceString::new(&mut rng);
                let round = KeyGenRound::new(&params, crs.sample_crp(&params))?;
                let share = p.public_key_share(&round, &mut rng)?;
                round.individual_public_key(&share)
            })
            .collect::<Result<Vec<_>, _>>()?
    );

    let (cts, extended) = timeit!("Encryption", {
        let cts = parties
            .par_iter()
            .zip(pks.par_iter())
            .map(|(p, pk)| {
                let input = vec![p.index() as u64; params.degree()];
                p.encrypt(&input, pk, &mut thread_rng())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let extended = cts
            .iter()
            .enumerate()
            .map(|(i, ct)| ExtendedCiphertext::extend(ct, i, num_parties))
            .collect::<Result<Vec<_>, _>>()?;
        (cts, extended)
    });

    let ct_add = timeit!("Computation", {
        let mut ct_add = extended[0].clone();
        Computer::new(&params).add(&extended[1], &extended[2], &mut ct_add)?;
        ct_add
    });

    timeit!("Decryption", {
        // Every participant decrypts its own ciphertext alone.
        for (p, ct) in parties.iter().zip(&cts) {
            let pt = p
                .decryption_share(ct, &mut thread_rng())?
                .finalize(ct, &[p.index()], p.index())?;
            let values = Vec::<u64>::try_decode(&pt, Encoding::simd())?;
            util::print_slots(&format!("party {}", p.index()), &values);
        }

        // The sum needs a share from every participant, each on its own slot.
        let shares = parties
            .par_iter()
            .map(|p| {
                let restricted = ct_add.restrict(p.index())?;
                p.decryption_share(&restricted, &mut thread_rng())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let all = (0..num_parties).collect::<Vec<_>>();
        let pt = DecryptionShare::from_shares(shares)?.finalize(&ct_add.zero_others(), &all, 0)?;
        let sum = Vec::<u64>::try_decode(&pt, Encoding::simd())?;
        util::print_slots("ct_add", &sum);
        info!(expected = 3, got = sum[0], "decrypted the sum of parties 1 and 2");
    });

    Ok(())
}
