use core::{
    pin::Pin,
    task::{Context, Poll},
};
use std::io::{Error, Result};

use crate::{session::Session, FlushMode};
use bytes::Bytes;
use futures_core::{ready, stream::Stream};
use pin_project_lite::pin_project;

#[derive(Debug)]
enum State {
    Start,
    Reading,
    Flushing,
    Done,
}

pin_project! {
    #[derive(Debug)]
    pub struct Transform<S, P> {
        #[pin]
        stream: S,
        session: P,
        state: State,
    }
}

impl<S: Stream<Item = Result<Bytes>>, P: Session> Transform<S, P> {
    pub fn new(stream: S, session: P) -> Self {
        Self {
            stream,
            session,
            state: State::Start,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn get_pin_mut(self: Pin<&mut Self>) -> Pin<&mut S> {
        self.project().stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    pub fn session(&self) -> &P {
        &self.session
    }
}

/// Release the session and end the adaptor with `err`.
fn abort<P: Session>(session: &mut P, state: &mut State, err: Error) -> Poll<Option<Result<Bytes>>> {
    session.cleanup();
    tracing::warn!(%err, "stream aborted, session released");
    *state = State::Done;
    Poll::Ready(Some(Err(err)))
}

impl<S: Stream<Item = Result<Bytes>>, P: Session> Stream for Transform<S, P> {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Bytes>>> {
        let mut this = self.project();

        loop {
            match this.state {
                State::Start => {
                    if let Err(err) = this.session.initialize() {
                        return abort(this.session, this.state, err.into());
                    }
                    *this.state = State::Reading;
                }

                State::Reading => match ready!(this.stream.as_mut().poll_next(cx)) {
                    Some(Ok(chunk)) => match this.session.feed(&chunk, false, FlushMode::Auto) {
                        Ok(output) if output.is_empty() => {}
                        Ok(output) => return Poll::Ready(Some(Ok(Bytes::copy_from_slice(&output)))),
                        Err(err) => return abort(this.session, this.state, err.into()),
                    },
                    Some(Err(err)) => return abort(this.session, this.state, err),
                    None => *this.state = State::Flushing,
                },

                State::Flushing => {
                    *this.state = State::Done;
                    match this.session.finish() {
                        Ok(output) if output.is_empty() => return Poll::Ready(None),
                        Ok(output) => return Poll::Ready(Some(Ok(Bytes::copy_from_slice(&output)))),
                        Err(err) => return abort(this.session, this.state, err.into()),
                    }
                }

                State::Done => return Poll::Ready(None),
            }
        }
    }
}
