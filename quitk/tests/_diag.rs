use num::complex::Complex64 as C64;
use quitk::linalg::{dag, ginibre, sqrtm_psd, eigh};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn diag_sqrtm() {
    let mut rng = StdRng::seed_from_u64(7);
    let g = ginibre(3, 3, &mut rng);
    let psd = g.dot(&dag(&g));
    let s = sqrtm_psd(&psd).unwrap();
    let back = s.dot(&s);
    let maxd = psd.iter().zip(back.iter()).map(|(x,y)| (x-y).norm()).fold(0.0f64, f64::max);
    let herm = psd.iter().zip(dag(&psd).iter()).map(|(x,y):(&C64,&C64)| (x-y).norm()).fold(0.0f64, f64::max);
    let (w, v) = eigh(&psd).unwrap();
    // check unitarity of v
    let vu = dag(&v).dot(&v);
    let mut uni = 0.0f64;
    for i in 0..3 { for j in 0..3 { let e = if i==j {C64::new(1.0,0.0)} else {C64::new(0.0,0.0)}; uni = uni.max((vu[(i,j)]-e).norm()); } }
    println!("DIAG maxd={:e} herm={:e} w={:?} unitarity={:e}", maxd, herm, w, uni);
}

#[test]
fn diag_broadcast() {
    use ndarray::{arr1, arr2};
    let v = arr2(&[[C64::new(1.0,0.0), C64::new(2.0,0.0)],
                   [C64::new(3.0,0.0), C64::new(4.0,0.0)]]);
    let fw = arr1(&[C64::new(10.0,0.0), C64::new(100.0,0.0)]);
    let scaled = &v * &fw;
    // column-scaling would give [[10,200],[30,400]]; row-scaling [[10,20],[300,400]]
    println!("BROADCAST scaled={:?}", scaled.iter().map(|c| c.re).collect::<Vec<_>>());
}

#[test]
fn diag_recon() {
    use ndarray::Array1;
    let mut rng = StdRng::seed_from_u64(7);
    let g = ginibre(3, 3, &mut rng);
    let psd = g.dot(&dag(&g));
    let (w, v) = eigh(&psd).unwrap();
    let fw: Array1<C64> = w.iter().map(|&l| C64::new(l,0.0)).collect();
    // columns-as-eigenvectors reconstruction: V diag(w) V^dag
    let col = (&v * &fw).dot(&dag(&v));
    // rows-as-eigenvectors: V^dag diag(w) V
    let row = dag(&v).dot(&(&v * &fw.view().insert_axis(ndarray::Axis(1))));
    let dcol = psd.iter().zip(col.iter()).map(|(x,y)| (x-y).norm()).fold(0.0f64,f64::max);
    let drow = psd.iter().zip(row.iter()).map(|(x,y)| (x-y).norm()).fold(0.0f64,f64::max);
    println!("RECON dcol={:e} drow={:e}", dcol, drow);
}

#[test]
fn diag_eigrel() {
    let mut rng = StdRng::seed_from_u64(7);
    let g = ginibre(3, 3, &mut rng);
    let psd = g.dot(&dag(&g));
    let (w, v) = eigh(&psd).unwrap();
    // V^dag A V should be diag(w)
    let d = dag(&v).dot(&psd).dot(&v);
    println!("EIGREL w={:?}", w.iter().cloned().collect::<Vec<_>>());
    for i in 0..3 { println!("  row{}: {:?}", i, (0..3).map(|j| format!("{:.4}", d[(i,j)].re)).collect::<Vec<_>>()); }
    // Also A*v_k vs w_k v_k for k=0
    let av = psd.dot(&v);
    let mut maxrel = 0.0f64;
    for k in 0..3 { for i in 0..3 { maxrel = maxrel.max((av[(i,k)] - w[k]*v[(i,k)]).norm()); } }
    println!("EIGREL Av-wv max={:e}", maxrel);
}

#[test]
fn diag_layout() {
    use ndarray::Array1;
    let mut rng = StdRng::seed_from_u64(7);
    let g = ginibre(3, 3, &mut rng);
    let psd = g.dot(&dag(&g));
    let (w, v) = eigh(&psd).unwrap();
    let fw: Array1<C64> = w.iter().map(|&l| C64::new(l,0.0)).collect();
    let vt = v.t().to_owned();
    let vc = v.mapv(|c| c.conj());
    let cands: Vec<(&str, ndarray::Array2<C64>)> = vec![
        ("V diag Vdag", (&v * &fw).dot(&dag(&v))),
        ("Vdag diag V", dag(&v).dot(&(&v * &fw)).to_owned()),
        ("conjV diag conjVdag", (&vc * &fw).dot(&dag(&vc))),
        ("Vt diag conj(Vt)", (&vt * &fw).dot(&vt.mapv(|c|c.conj()).t())),
    ];
    for (name, m) in &cands {
        let d = psd.iter().zip(m.iter()).map(|(x,y)| (x-y).norm()).fold(0.0f64,f64::max);
        println!("LAYOUT {:<22} err={:e}", name, d);
    }
}
